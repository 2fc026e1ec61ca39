//! collider3d - 3D spatial indexing and narrow-phase collision detection
//!
//! This crate provides the geometry layer beneath a physics or game-world
//! simulation: a closed set of collision shapes, pairwise narrow-phase
//! contact generation between any two of them, and a Morton-coded spatial
//! index for broad-phase range/k-NN/ray queries over many entities. It
//! includes:
//!
//! - **Shapes**: sphere, box, oriented box, capsule, convex hull, triangle
//!   mesh, and heightmap, behind one closed `Shape` enum.
//! - **Narrow-phase collision**: symmetric pairwise dispatch over all
//!   seven shape tags, full 15-axis SAT for box/OBB pairs, Voronoi-region
//!   closest features for the rest.
//! - **Spatial index**: a Morton-keyed grid supporting range, k-NN, and
//!   ray queries plus a four-phase entity move protocol.
//! - **Geometry kernels**: AABBs, rays, and the closest-point/intersection
//!   primitives the rest of the crate builds on.
//!
//! # Examples
//!
//! ## Narrow-phase contact between two shapes
//!
//! ```
//! use collider3d::prelude::*;
//!
//! let a = Shape::Sphere(Sphere::new(Point3::origin(), 1.0).unwrap());
//! let b = Shape::Sphere(Sphere::new(Point3::new(1.5, 0.0, 0.0), 1.0).unwrap());
//!
//! match detect_collision(&a, &b) {
//!     ContactResult::Collision(contact) => {
//!         println!("penetration: {:.3}", contact.penetration);
//!     }
//!     ContactResult::NoCollision => {}
//! }
//! ```
//!
//! ## Spatial index range query
//!
//! ```
//! use collider3d::prelude::*;
//!
//! let grid = MortonGrid { origin: Point3::origin(), root_extent: 1024.0 };
//! let mut index = SpatialIndex::new(grid, ColliderConfig::default());
//! index.insert_point(1, Point3::new(5.0, 5.0, 5.0), 6).unwrap();
//!
//! let region = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
//! assert_eq!(index.query_range(&region), vec![1]);
//! ```

// Re-export core dependencies for convenience.
pub use nalgebra;
pub use serde;

// Module declarations.
pub mod collision;
pub mod config;
pub mod error;
pub mod geom;
pub mod index;
pub mod math;
pub mod mesh;
pub mod shape;

pub use collision::{detect_collision, detect_collisions_parallel, Contact, ContactResult};
pub use config::ColliderConfig;
pub use error::{ColliderError, Result};
pub use geom::{Aabb, Ray3, RayHit};
pub use index::{Frustum, IndexStats, KeyInterval, MortonGrid, MortonKey, Plane, SpatialIndex};
pub use math::{Matrix3, Point3, Vector3};
pub use shape::{BoxShape, Capsule, ConvexHull, Heightmap, OrientedBox, Shape, ShapeTag, Sphere};

/// Convenience re-export of everything needed to build shapes, run
/// narrow-phase dispatch, and drive the spatial index from a single
/// `use collider3d::prelude::*;`.
pub mod prelude {
    pub use crate::collision::{detect_collision, detect_collisions_parallel, Contact, ContactResult};
    pub use crate::config::ColliderConfig;
    pub use crate::error::{ColliderError, Result};
    pub use crate::geom::{Aabb, Ray3, RayHit};
    pub use crate::index::{Frustum, IndexStats, KeyInterval, MortonGrid, MortonKey, Plane, SpatialIndex};
    pub use crate::math::{Matrix3, Point3, Vector3};
    pub use crate::shape::{BoxShape, Capsule, ConvexHull, Heightmap, OrientedBox, Shape, ShapeTag, Sphere};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Returns version information.
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}

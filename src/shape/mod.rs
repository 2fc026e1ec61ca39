//! The shape model: a closed set of collision primitives sharing one
//! capability surface (`position`, `translate`, `aabb`, `support`,
//! `ray_intersect`).
//!
//! Grounded on the `CollisionShape` enum pattern from the source engine's
//! collision module, generalized from five variants to the seven this
//! crate supports and widened with cached-derived-state fields (inverse
//! orientation, cached AABB).

mod capsule;
mod convex_hull;
mod heightmap;
mod obb;
mod sphere;
mod triangle_mesh;

pub use capsule::Capsule;
pub use convex_hull::ConvexHull;
pub use heightmap::Heightmap;
pub use obb::{is_degenerate_axis, BoxShape, OrientedBox};
pub use sphere::Sphere;
pub use triangle_mesh::TriangleMesh;

use crate::error::Result;
use crate::geom::{Aabb, Ray3, RayHit};
use crate::math::{Point3, Vector3};

/// A collision shape: one of the seven closed variants.
///
/// Pair dispatch (`crate::collision`) matches on the tag pair rather than
/// using dynamic dispatch, so this enum — not a trait object — is the
/// shape type callers hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A sphere.
    Sphere(Sphere),
    /// An axis-aligned box.
    Box(BoxShape),
    /// An oriented box.
    OrientedBox(OrientedBox),
    /// A capsule (swept sphere along a segment).
    Capsule(Capsule),
    /// A convex hull given as vertices + triangulated faces.
    ConvexHull(ConvexHull),
    /// An immutable triangle soup with an owned BVH.
    TriangleMesh(TriangleMesh),
    /// A heightfield terrain patch.
    Heightmap(Heightmap),
}

impl Shape {
    /// Shape-defining "position": the sphere/box/OBB/capsule center, the
    /// hull centroid, the mesh's own origin (always the world origin,
    /// since mesh vertices are stored in world space), or the heightmap
    /// origin.
    pub fn position(&self) -> Point3 {
        match self {
            Shape::Sphere(s) => s.center,
            Shape::Box(b) => b.center,
            Shape::OrientedBox(o) => o.center,
            Shape::Capsule(c) => c.center(),
            Shape::ConvexHull(h) => h.centroid,
            Shape::TriangleMesh(_) => Point3::origin(),
            Shape::Heightmap(h) => h.origin,
        }
    }

    /// Translates the shape by `delta`, refreshing every cached
    /// derived value (AABB, inverse orientation stays unchanged since
    /// rotation is immutable).
    pub fn translate(&mut self, delta: Vector3) {
        match self {
            Shape::Sphere(s) => s.translate(delta),
            Shape::Box(b) => b.translate(delta),
            Shape::OrientedBox(o) => o.translate(delta),
            Shape::Capsule(c) => c.translate(delta),
            Shape::ConvexHull(h) => h.translate(delta),
            Shape::TriangleMesh(m) => m.translate(delta),
            Shape::Heightmap(h) => h.translate(delta),
        }
    }

    /// World-space bounding box.
    pub fn aabb(&self) -> Aabb {
        match self {
            Shape::Sphere(s) => s.aabb(),
            Shape::Box(b) => b.aabb(),
            Shape::OrientedBox(o) => o.aabb(),
            Shape::Capsule(c) => c.aabb(),
            Shape::ConvexHull(h) => h.aabb(),
            Shape::TriangleMesh(m) => m.aabb(),
            Shape::Heightmap(h) => h.aabb(),
        }
    }

    /// Point on the shape with maximal projection onto `d`.
    ///
    /// Not meaningful for `TriangleMesh`/`Heightmap` (neither pair
    /// dispatch nor GJK-style queries need a support function for them);
    /// returns the shape's `position()` as a harmless fallback rather
    /// than panicking, since this is a total function over all seven
    /// variants.
    pub fn support(&self, d: Vector3) -> Point3 {
        match self {
            Shape::Sphere(s) => s.support(d),
            Shape::Box(b) => b.support(d),
            Shape::OrientedBox(o) => o.support(d),
            Shape::Capsule(c) => c.support(d),
            Shape::ConvexHull(h) => h.support(d),
            Shape::TriangleMesh(_) | Shape::Heightmap(_) => self.position(),
        }
    }

    /// Casts `ray` against the shape.
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        match self {
            Shape::Sphere(s) => s.ray_intersect(ray),
            Shape::Box(b) => b.ray_intersect(ray),
            Shape::OrientedBox(o) => o.ray_intersect(ray),
            Shape::Capsule(c) => c.ray_intersect(ray),
            Shape::ConvexHull(h) => h.ray_intersect(ray),
            Shape::TriangleMesh(m) => m.ray_intersect(ray),
            Shape::Heightmap(h) => h.ray_intersect(ray),
        }
    }

    /// A short tag naming the variant, used by the pair dispatcher's match
    /// and in diagnostics.
    pub fn tag(&self) -> ShapeTag {
        match self {
            Shape::Sphere(_) => ShapeTag::Sphere,
            Shape::Box(_) => ShapeTag::Box,
            Shape::OrientedBox(_) => ShapeTag::OrientedBox,
            Shape::Capsule(_) => ShapeTag::Capsule,
            Shape::ConvexHull(_) => ShapeTag::ConvexHull,
            Shape::TriangleMesh(_) => ShapeTag::TriangleMesh,
            Shape::Heightmap(_) => ShapeTag::Heightmap,
        }
    }
}

/// The seven closed shape tags, used to index the pair dispatcher's
/// 7x7 match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTag {
    /// Sphere.
    Sphere,
    /// Axis-aligned box.
    Box,
    /// Oriented box.
    OrientedBox,
    /// Capsule.
    Capsule,
    /// Convex hull.
    ConvexHull,
    /// Triangle mesh.
    TriangleMesh,
    /// Heightmap.
    Heightmap,
}

pub(crate) fn validate_positive(name: &'static str, value: f32) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(crate::error::ColliderError::invalid_parameter(
            name,
            "must be positive",
        ))
    }
}

pub(crate) fn validate_non_negative(name: &'static str, value: f32) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(crate::error::ColliderError::invalid_parameter(
            name,
            "must be non-negative",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_variant() {
        let shape = Shape::Sphere(Sphere::new(Point3::origin(), 1.0).unwrap());
        assert_eq!(shape.tag(), ShapeTag::Sphere);
    }
}

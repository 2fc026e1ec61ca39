//! Vector math kernel: fixed-size 3-float points/vectors and 3x3 matrices.
//!
//! Built directly on `nalgebra`'s `Point3`/`Vector3`/`Matrix3` rather than
//! hand-rolled types, matching how every math-heavy crate in this codebase
//! leans on `nalgebra` instead of reimplementing linear algebra. All
//! geometry in this crate uses 32-bit floats (`f32`), per the data model.

mod matrix;
mod vector;

pub use matrix::{transform_point, transform_vector};
pub use vector::make_perpendicular;
pub(crate) use vector::axis_component;

/// A point in 3D space. Alias over `nalgebra::Point3<f32>`.
pub type Point3 = nalgebra::Point3<f32>;

/// A displacement/direction in 3D space. Alias over `nalgebra::Vector3<f32>`.
pub type Vector3 = nalgebra::Vector3<f32>;

/// A 3x3 matrix, used for OBB orientation and inertia-like transforms.
///
/// Stored and indexed the way `nalgebra` stores `Matrix3`: column-major.
/// `Matrix3::column(i)` returns column `i`; `transform_point`/
/// `transform_vector` apply it as `M * v`.
pub type Matrix3 = nalgebra::Matrix3<f32>;

/// Small epsilon for treating a direction component as parallel/degenerate.
pub const EPS_PARALLEL: f32 = crate::config::EPS_PARALLEL;

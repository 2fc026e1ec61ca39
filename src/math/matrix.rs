//! Matrix3 helpers: transform and column extraction are thin wrappers over
//! `nalgebra` so call sites read in terms of points and vectors directly.

use super::{Matrix3, Point3, Vector3};

/// Applies `m` to a point: `m * v`.
pub fn transform_point(m: &Matrix3, p: Point3) -> Point3 {
    Point3::from(m * p.coords)
}

/// Applies `m` to a direction: `m * v`.
pub fn transform_vector(m: &Matrix3, v: Vector3) -> Vector3 {
    m * v
}

//! Axis-aligned bounding box.

use crate::math::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with `min <= max` componentwise.
///
/// `translate(delta)` always produces `min + delta, max + delta`, which is
/// the invariant every cached shape AABB must preserve after a move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Builds an AABB from explicit min/max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Builds an AABB from a center and half-extents.
    pub fn from_center_half_extents(center: Point3, half_extents: Vector3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Builds the smallest AABB containing every point in `points`.
    ///
    /// Returns `None` for an empty slice (callers fall back to a
    /// degenerate point AABB where that makes sense).
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let mut iter = points.iter();
        let first = *iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some(Self { min, max })
    }

    /// Translates the AABB by `delta`, preserving the `min <= max` invariant.
    pub fn translate(&self, delta: Vector3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Center of the AABB.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half-extents of the AABB.
    pub fn half_extents(&self) -> Vector3 {
        (self.max - self.min) / 2.0
    }

    /// Whether `self` overlaps `other` (touching counts as overlapping).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Whether `point` lies within (or on the boundary of) this AABB.
    pub fn contains_point(&self, point: Point3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Whether `other` is fully contained within `self`.
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Smallest AABB containing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Closest point on (or inside) the AABB to `p`.
    pub fn closest_point(&self, p: Point3) -> Point3 {
        Point3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Squared distance from `p` to the closest point on the AABB (0 if
    /// `p` is inside).
    pub fn distance_squared(&self, p: Point3) -> f32 {
        (self.closest_point(p) - p).norm_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_preserves_shape() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = a.translate(Vector3::new(2.0, -1.0, 0.5));
        assert_eq!(b.min, Point3::new(2.0, -1.0, 0.5));
        assert_eq!(b.max, Point3::new(3.0, 0.0, 1.5));
    }

    #[test]
    fn overlap_and_disjoint() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(1.5, 1.5, 1.5));
        let c = Aabb::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn closest_point_clamps_componentwise() {
        let a = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let p = Point3::new(5.0, 0.0, -5.0);
        assert_eq!(a.closest_point(p), Point3::new(1.0, 0.0, -1.0));
    }
}

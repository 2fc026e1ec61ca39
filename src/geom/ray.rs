//! Rays and ray-cast results.

use crate::math::{Point3, Vector3};

/// A ray cast with a bounded maximum travel distance.
///
/// `direction` is expected to be a unit vector; callers that build a `Ray3`
/// from an arbitrary direction should normalize first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3 {
    /// Ray origin.
    pub origin: Point3,
    /// Unit-length travel direction.
    pub direction: Vector3,
    /// Maximum parametric distance considered a hit.
    pub max_distance: f32,
}

impl Ray3 {
    /// Builds a ray, normalizing `direction`.
    pub fn new(origin: Point3, direction: Vector3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            max_distance,
        }
    }

    /// Point along the ray at parameter `t`.
    pub fn point_at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Result of casting a `Ray3` against a shape or the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayHit {
    /// The ray did not hit anything within `max_distance`.
    Miss,
    /// The ray hit something at parametric distance `t >= 0`.
    Hit {
        /// Parametric distance along the ray.
        t: f32,
        /// World-space point of impact.
        point: Point3,
        /// Surface normal at the point of impact.
        normal: Vector3,
    },
}

impl RayHit {
    /// `true` if this is a `Hit`.
    pub fn is_hit(&self) -> bool {
        matches!(self, RayHit::Hit { .. })
    }

    /// The hit distance, or `None` for a miss.
    pub fn t(&self) -> Option<f32> {
        match self {
            RayHit::Hit { t, .. } => Some(*t),
            RayHit::Miss => None,
        }
    }
}

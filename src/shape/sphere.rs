//! Sphere shape.

use crate::error::Result;
use crate::geom::{Aabb, Ray3, RayHit};
use crate::math::{Point3, Vector3, EPS_PARALLEL};

use super::validate_positive;

/// A sphere: center plus radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// World-space center.
    pub center: Point3,
    /// Radius, always `> 0`.
    pub radius: f32,
}

impl Sphere {
    /// Builds a sphere, refusing a non-positive radius.
    pub fn new(center: Point3, radius: f32) -> Result<Self> {
        validate_positive("radius", radius)?;
        Ok(Self { center, radius })
    }

    /// Translates the sphere's center.
    pub fn translate(&mut self, delta: Vector3) {
        self.center += delta;
    }

    /// World-space bounding box.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vector3::new(self.radius, self.radius, self.radius))
    }

    /// `center + radius * d_hat`.
    pub fn support(&self, d: Vector3) -> Point3 {
        let d_hat = if d.norm_squared() < EPS_PARALLEL {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            d.normalize()
        };
        self.center + d_hat * self.radius
    }

    /// Quadratic ray-vs-sphere, returning the smallest non-negative root
    /// within `ray.max_distance`.
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction);
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return RayHit::Miss;
        }
        let sqrt_disc = discriminant.sqrt();
        let t0 = -b - sqrt_disc;
        let t1 = -b + sqrt_disc;
        let t = if t0 >= 0.0 {
            t0
        } else if t1 >= 0.0 {
            t1
        } else {
            return RayHit::Miss;
        };
        if t > ray.max_distance {
            return RayHit::Miss;
        }
        let point = ray.point_at(t);
        let normal = (point - self.center).normalize();
        RayHit::Hit { t, point, normal }
    }
}

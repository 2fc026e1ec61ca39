//! Capsule shape: a swept sphere along a segment.

use crate::error::Result;
use crate::geom::{closest_point_on_segment, Aabb, Ray3, RayHit};
use crate::math::{Point3, Vector3, EPS_PARALLEL};

use super::sphere::Sphere;
use super::validate_positive;

/// A capsule: two endpoints plus a radius swept along the segment between
/// them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// First segment endpoint.
    pub endpoint1: Point3,
    /// Second segment endpoint.
    pub endpoint2: Point3,
    /// Sweep radius, always `> 0`.
    pub radius: f32,
}

impl Capsule {
    /// Builds a capsule, refusing a non-positive radius.
    pub fn new(endpoint1: Point3, endpoint2: Point3, radius: f32) -> Result<Self> {
        validate_positive("radius", radius)?;
        Ok(Self {
            endpoint1,
            endpoint2,
            radius,
        })
    }

    /// `|p2 - p1|`.
    pub fn height(&self) -> f32 {
        (self.endpoint2 - self.endpoint1).norm()
    }

    /// Midpoint of the segment; this is the capsule's `position()`.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.endpoint1, &self.endpoint2)
    }

    /// Translates both endpoints (and thus the center) by `delta`.
    pub fn translate(&mut self, delta: Vector3) {
        self.endpoint1 += delta;
        self.endpoint2 += delta;
    }

    /// World-space bounding box: the segment's AABB expanded by `radius`
    /// on every axis.
    pub fn aabb(&self) -> Aabb {
        let segment = Aabb::from_points(&[self.endpoint1, self.endpoint2])
            .expect("a capsule always has two endpoints");
        Aabb::new(
            segment.min - Vector3::new(self.radius, self.radius, self.radius),
            segment.max + Vector3::new(self.radius, self.radius, self.radius),
        )
    }

    /// Closest point on the capsule's core segment to `p`.
    pub fn closest_point_on_segment(&self, p: Point3) -> Point3 {
        closest_point_on_segment(self.endpoint1, self.endpoint2, p)
    }

    /// Whichever endpoint projects further along `d`, offset by
    /// `radius * d_hat`.
    pub fn support(&self, d: Vector3) -> Point3 {
        let d_hat = if d.norm_squared() < EPS_PARALLEL {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            d.normalize()
        };
        let base = if self.endpoint1.coords.dot(&d_hat) >= self.endpoint2.coords.dot(&d_hat) {
            self.endpoint1
        } else {
            self.endpoint2
        };
        base + d_hat * self.radius
    }

    /// Ray vs. the infinite cylinder through the segment axis, restricted
    /// to the segment's parameter range, plus the two end-sphere tests;
    /// returns the smallest valid non-negative `t`.
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        let axis = self.endpoint2 - self.endpoint1;
        let length = axis.norm();

        let mut best: Option<(f32, Point3, Vector3)> = None;

        if length > EPS_PARALLEL {
            let u = axis / length;
            let w = ray.origin - self.endpoint1;
            let w_dot_u = w.dot(&u);
            let d_dot_u = ray.direction.dot(&u);
            let w_perp = w - u * w_dot_u;
            let d_perp = ray.direction - u * d_dot_u;

            let a = d_perp.norm_squared();
            if a > EPS_PARALLEL {
                let b = w_perp.dot(&d_perp);
                let c = w_perp.norm_squared() - self.radius * self.radius;
                let discriminant = b * b - a * c;
                if discriminant >= 0.0 {
                    let sqrt_disc = discriminant.sqrt();
                    for &t in &[(-b - sqrt_disc) / a, (-b + sqrt_disc) / a] {
                        if t < 0.0 || t > ray.max_distance {
                            continue;
                        }
                        let s = w_dot_u + t * d_dot_u;
                        if (0.0..=length).contains(&s) {
                            let point = ray.point_at(t);
                            let axis_point = self.endpoint1 + u * s;
                            let normal = (point - axis_point).normalize();
                            if best.map_or(true, |(best_t, _, _)| t < best_t) {
                                best = Some((t, point, normal));
                            }
                        }
                    }
                }
            }
        }

        for endpoint in [self.endpoint1, self.endpoint2] {
            let sphere = Sphere {
                center: endpoint,
                radius: self.radius,
            };
            if let RayHit::Hit { t, point, normal } = sphere.ray_intersect(ray) {
                if best.map_or(true, |(best_t, _, _)| t < best_t) {
                    best = Some((t, point, normal));
                }
            }
        }

        match best {
            Some((t, point, normal)) => RayHit::Hit { t, point, normal },
            None => RayHit::Miss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_matches_endpoint_distance() {
        let c = Capsule::new(Point3::origin(), Point3::new(0.0, 10.0, 0.0), 0.5).unwrap();
        assert!((c.height() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn translate_moves_both_endpoints() {
        let mut c = Capsule::new(Point3::origin(), Point3::new(0.0, 10.0, 0.0), 0.5).unwrap();
        c.translate(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(c.endpoint1, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(c.endpoint2, Point3::new(1.0, 10.0, 0.0));
    }

    #[test]
    fn ray_hits_cylindrical_side() {
        let c = Capsule::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 10.0, 0.0), 1.0).unwrap();
        let ray = Ray3::new(Point3::new(-5.0, 5.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 100.0);
        let hit = c.ray_intersect(&ray);
        assert!(hit.is_hit());
        assert_eq!(hit.t(), Some(4.0));
    }

    #[test]
    fn ray_hits_end_cap() {
        let c = Capsule::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 10.0, 0.0), 1.0).unwrap();
        let ray = Ray3::new(Point3::new(0.0, 15.0, 0.0), Vector3::new(0.0, -1.0, 0.0), 100.0);
        let hit = c.ray_intersect(&ray);
        assert!(hit.is_hit());
        assert_eq!(hit.t(), Some(4.0));
    }
}

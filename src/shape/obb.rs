//! Axis-aligned and oriented box shapes.

use crate::config::{EPS_FACE_SELECT_AABB, EPS_FACE_SELECT_OBB};
use crate::error::Result;
use crate::geom::{self, Aabb, Ray3, RayHit};
use crate::math::{transform_point, transform_vector, Matrix3, Point3, Vector3, EPS_PARALLEL};

use super::validate_non_negative;

/// An axis-aligned box: center plus half-extents, with its AABB cached
/// (for an axis-aligned box the cache is just `center +/- half_extents`,
/// but it is stored rather than recomputed to match the invariant every
/// other shape follows).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    /// World-space center.
    pub center: Point3,
    /// Half-extents along x, y, z. Componentwise `>= 0`.
    pub half_extents: Vector3,
    cached_aabb: Aabb,
}

impl BoxShape {
    /// Builds a box shape, refusing negative half-extents.
    pub fn new(center: Point3, half_extents: Vector3) -> Result<Self> {
        validate_non_negative("half_extents.x", half_extents.x)?;
        validate_non_negative("half_extents.y", half_extents.y)?;
        validate_non_negative("half_extents.z", half_extents.z)?;
        Ok(Self {
            center,
            half_extents,
            cached_aabb: Aabb::from_center_half_extents(center, half_extents),
        })
    }

    /// Translates the box, refreshing the cached AABB.
    pub fn translate(&mut self, delta: Vector3) {
        self.center += delta;
        self.cached_aabb = self.cached_aabb.translate(delta);
    }

    /// World-space bounding box (identical to the box itself, since it is
    /// axis-aligned).
    pub fn aabb(&self) -> Aabb {
        self.cached_aabb
    }

    /// `center + sign(d) * half_extents`, componentwise.
    pub fn support(&self, d: Vector3) -> Point3 {
        self.center
            + Vector3::new(
                d.x.signum() * self.half_extents.x,
                d.y.signum() * self.half_extents.y,
                d.z.signum() * self.half_extents.z,
            )
    }

    /// Slab-method ray-vs-box intersection. The hit normal is re-derived
    /// from the hit point via [`geom::face_normal_within_eps`] rather than
    /// taken as-is from the slab method's axis bookkeeping, so
    /// `EPS_FACE_SELECT_AABB` actually governs face selection.
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        match geom::ray_vs_aabb(ray, &self.cached_aabb) {
            RayHit::Miss => RayHit::Miss,
            RayHit::Hit { t, point, .. } => {
                let local_point = point - self.center.coords;
                RayHit::Hit {
                    t,
                    point,
                    normal: geom::face_normal_within_eps(self.half_extents, local_point, EPS_FACE_SELECT_AABB),
                }
            }
        }
    }
}

/// An oriented box: center, half-extents in local axes, and an orthonormal
/// orientation matrix `R`. The inverse orientation `R^T` is cached and
/// recomputed only when `R` changes (rotation is immutable after
/// construction — to rotate, build a new `OrientedBox`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center.
    pub center: Point3,
    /// Half-extents along the box's own local axes. Componentwise `>= 0`.
    pub half_extents: Vector3,
    /// Orientation: columns are the box's local x/y/z axes in world space.
    pub orientation: Matrix3,
    inverse_orientation: Matrix3,
}

impl OrientedBox {
    /// Builds an oriented box. `orientation` must be orthonormal; this is
    /// trusted (not re-verified) rather than checked on every construction.
    pub fn new(center: Point3, half_extents: Vector3, orientation: Matrix3) -> Result<Self> {
        validate_non_negative("half_extents.x", half_extents.x)?;
        validate_non_negative("half_extents.y", half_extents.y)?;
        validate_non_negative("half_extents.z", half_extents.z)?;
        Ok(Self {
            center,
            half_extents,
            orientation,
            inverse_orientation: orientation.transpose(),
        })
    }

    /// Translates the box's center. Orientation is unaffected.
    pub fn translate(&mut self, delta: Vector3) {
        self.center += delta;
    }

    /// World-space AABB: transforms all eight corner offsets into world
    /// space and takes their bounding box.
    pub fn aabb(&self) -> Aabb {
        let axes = [
            self.orientation.column(0).into_owned(),
            self.orientation.column(1).into_owned(),
            self.orientation.column(2).into_owned(),
        ];
        let extent = axes[0] * self.half_extents.x.abs()
            + axes[1] * self.half_extents.y.abs()
            + axes[2] * self.half_extents.z.abs();
        let world_half_extents = Vector3::new(
            axes[0].x.abs() * self.half_extents.x
                + axes[1].x.abs() * self.half_extents.y
                + axes[2].x.abs() * self.half_extents.z,
            axes[0].y.abs() * self.half_extents.x
                + axes[1].y.abs() * self.half_extents.y
                + axes[2].y.abs() * self.half_extents.z,
            axes[0].z.abs() * self.half_extents.x
                + axes[1].z.abs() * self.half_extents.y
                + axes[2].z.abs() * self.half_extents.z,
        );
        let _ = extent;
        Aabb::from_center_half_extents(self.center, world_half_extents)
    }

    /// Transforms a world-space point into the box's local frame.
    pub fn world_to_local_point(&self, p: Point3) -> Point3 {
        transform_point(&self.inverse_orientation, p - self.center.coords)
    }

    /// Transforms a local-space point into world space.
    pub fn local_to_world_point(&self, p: Point3) -> Point3 {
        self.center + transform_vector(&self.orientation, p.coords)
    }

    /// Transforms a world-space direction into the box's local frame.
    pub fn world_to_local_vector(&self, v: Vector3) -> Vector3 {
        transform_vector(&self.inverse_orientation, v)
    }

    /// Transforms a local-space direction into world space.
    pub fn local_to_world_vector(&self, v: Vector3) -> Vector3 {
        transform_vector(&self.orientation, v)
    }

    /// `center + R * (sign(R^T d) * half_extents)`.
    pub fn support(&self, d: Vector3) -> Point3 {
        let local_d = self.world_to_local_vector(d);
        let local_support = Vector3::new(
            local_d.x.signum() * self.half_extents.x,
            local_d.y.signum() * self.half_extents.y,
            local_d.z.signum() * self.half_extents.z,
        );
        self.center + self.local_to_world_vector(local_support)
    }

    /// Transforms `ray` into local space, applies the slab method, then
    /// maps the hit point and normal back to world space.
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        let local_origin = self.world_to_local_point(ray.origin);
        let local_direction = self.world_to_local_vector(ray.direction);
        let local_ray = Ray3 {
            origin: local_origin,
            direction: local_direction,
            max_distance: ray.max_distance,
        };
        let local_aabb = Aabb::from_center_half_extents(Point3::origin(), self.half_extents);
        match geom::ray_vs_aabb(&local_ray, &local_aabb) {
            RayHit::Miss => RayHit::Miss,
            RayHit::Hit { t, point, .. } => {
                let local_normal = geom::face_normal_within_eps(self.half_extents, point, EPS_FACE_SELECT_OBB);
                RayHit::Hit {
                    t,
                    point: self.local_to_world_point(point),
                    normal: self.local_to_world_vector(local_normal),
                }
            }
        }
    }

    /// Outward normal of the face nearest a point known to be inside the
    /// box, expressed in local space.
    pub fn closest_face_normal_local(&self, local_point: Point3) -> Vector3 {
        geom::closest_face_normal(self.half_extents, local_point)
    }
}

/// Whether `a.x.abs() < eps` style near-zero test, shared by the
/// edge-cross-product axis generation in AABB-vs-OBB SAT.
pub(crate) fn is_degenerate_axis(v: Vector3) -> bool {
    v.norm_squared() < EPS_PARALLEL
}

//! Geometry kernels: AABB, rays, and the closest-point / intersection
//! primitives the pair dispatcher and BVH build on.

mod aabb;
mod kernels;
mod ray;

pub use aabb::Aabb;
pub use kernels::{
    aabb_overlap, aabb_vs_aabb_mtv, closest_face_normal, closest_point_on_aabb,
    closest_point_on_segment, closest_point_on_triangle, closest_points_segment_segment,
    face_normal_within_eps, ray_vs_aabb, ray_vs_triangle, sat_axis_overlap, Mtv,
};
pub use ray::{Ray3, RayHit};

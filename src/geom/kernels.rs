//! Closest-point and intersection kernels shared by the collision
//! dispatcher and the BVH.
//!
//! Grounded on the axis-projection style used by the separating-axis test
//! (`project_vertices`/axis testing) generalized here to closest-point and
//! ray queries as well.

use crate::geom::Aabb;
use crate::geom::Ray3;
use crate::geom::RayHit;
use crate::math::axis_component;
use crate::math::{Matrix3, Point3, Vector3, EPS_PARALLEL};

/// Minimum translation vector separating two overlapping AABBs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mtv {
    /// Unit separating axis, pointing from `a` toward `b`.
    pub axis: Vector3,
    /// Penetration depth along `axis`.
    pub penetration: f32,
}

/// Whether two AABBs overlap (touching counts as overlapping).
pub fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(b)
}

/// Minimum translation vector to separate two overlapping AABBs along the
/// axis of least penetration.
///
/// Returns `None` if the boxes do not overlap.
pub fn aabb_vs_aabb_mtv(a: &Aabb, b: &Aabb) -> Option<Mtv> {
    if !a.overlaps(b) {
        return None;
    }
    let overlap_x = (a.max.x.min(b.max.x)) - (a.min.x.max(b.min.x));
    let overlap_y = (a.max.y.min(b.max.y)) - (a.min.y.max(b.min.y));
    let overlap_z = (a.max.z.min(b.max.z)) - (a.min.z.max(b.min.z));

    let center_a = a.center();
    let center_b = b.center();
    let delta = center_b - center_a;

    let candidates = [
        (overlap_x, Vector3::x_axis().into_inner(), delta.x),
        (overlap_y, Vector3::y_axis().into_inner(), delta.y),
        (overlap_z, Vector3::z_axis().into_inner(), delta.z),
    ];

    let (penetration, mut axis, sign_component) = candidates
        .into_iter()
        .min_by(|lhs, rhs| lhs.0.partial_cmp(&rhs.0).expect("overlap is finite"))
        .expect("three candidates");

    if sign_component < 0.0 {
        axis = -axis;
    }

    Some(Mtv { axis, penetration })
}

/// Closest point on (or inside) `aabb` to `p`.
pub fn closest_point_on_aabb(aabb: &Aabb, p: Point3) -> Point3 {
    aabb.closest_point(p)
}

/// Outward normal of the OBB/AABB face nearest to a point already known to
/// be inside the box, given the box's local-space half extents and the
/// point expressed in local space.
///
/// Picks the axis whose distance to its nearest face is smallest; ties
/// favor the first axis checked (x, then y, then z).
pub fn closest_face_normal(half_extents: Vector3, local_point: Point3) -> Vector3 {
    let dx = half_extents.x - local_point.x.abs();
    let dy = half_extents.y - local_point.y.abs();
    let dz = half_extents.z - local_point.z.abs();

    let (_, axis) = [
        (dx, Vector3::x_axis().into_inner() * local_point.x.signum()),
        (dy, Vector3::y_axis().into_inner() * local_point.y.signum()),
        (dz, Vector3::z_axis().into_inner() * local_point.z.signum()),
    ]
    .into_iter()
    .fold((f32::INFINITY, Vector3::zeros()), |acc, candidate| {
        if candidate.0 < acc.0 {
            candidate
        } else {
            acc
        }
    });
    if axis.norm_squared() < EPS_PARALLEL {
        Vector3::x_axis().into_inner()
    } else {
        axis.normalize()
    }
}

/// Outward normal of the box face a boundary point (e.g. a ray hit) lies
/// on: the axis whose coordinate matches its face to within `eps`, ties
/// favoring x, then y, then z. Falls back to [`closest_face_normal`] if no
/// axis is within `eps` of its face.
pub fn face_normal_within_eps(half_extents: Vector3, local_point: Point3, eps: f32) -> Vector3 {
    let candidates = [
        (
            half_extents.x - local_point.x.abs(),
            Vector3::x_axis().into_inner() * local_point.x.signum(),
        ),
        (
            half_extents.y - local_point.y.abs(),
            Vector3::y_axis().into_inner() * local_point.y.signum(),
        ),
        (
            half_extents.z - local_point.z.abs(),
            Vector3::z_axis().into_inner() * local_point.z.signum(),
        ),
    ];
    candidates
        .into_iter()
        .filter(|(diff, _)| diff.abs() <= eps)
        .min_by(|(a, _), (b, _)| a.abs().partial_cmp(&b.abs()).unwrap())
        .map(|(_, axis)| axis)
        .unwrap_or_else(|| closest_face_normal(half_extents, local_point))
}

/// Closest point on segment `[a, b]` to point `p`.
pub fn closest_point_on_segment(a: Point3, b: Point3, p: Point3) -> Point3 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < EPS_PARALLEL {
        return a;
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest points between segments `[p1, q1]` and `[p2, q2]`.
///
/// Follows the standard two-parameter quadratic minimization (Ericson,
/// *Real-Time Collision Detection* §5.1.9): solves for `s, t` in the
/// unclamped system first, then clamps and re-solves against the clamped
/// endpoint when the unclamped solution falls outside `[0, 1]`. Nearly
/// parallel segments (`denom` close to zero) fall back to `s = 0`.
pub fn closest_points_segment_segment(
    p1: Point3,
    q1: Point3,
    p2: Point3,
    q2: Point3,
) -> (Point3, Point3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;

    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (mut s, mut t);

    if a < EPS_PARALLEL && e < EPS_PARALLEL {
        return (p1, p2);
    }
    if a < EPS_PARALLEL {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e < EPS_PARALLEL {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            if denom.abs() > EPS_PARALLEL {
                s = ((b * f - c * e) / denom).clamp(0.0, 1.0);
            } else {
                s = 0.0;
            }
            t = (b * s + f) / e;

            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
        }
    }

    (p1 + d1 * s, p2 + d2 * t)
}

/// Closest point on triangle `(a, b, c)` to point `p`.
///
/// Ericson's seven-region Voronoi test: classifies `p` against the three
/// vertex regions, three edge regions, and the face region in barycentric
/// coordinates without constructing any intermediate plane objects.
pub fn closest_point_on_triangle(a: Point3, b: Point3, c: Point3, p: Point3) -> Point3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Möller–Trumbore ray-vs-triangle intersection.
///
/// Rejects triangles nearly parallel to the ray (`|det| <= EPS_PARALLEL`),
/// requires `u in [0, 1]`, `v >= 0`, `u + v <= 1`, and `t` strictly greater
/// than `EPS_PARALLEL` so a ray starting on the triangle's own plane does
/// not self-intersect.
pub fn ray_vs_triangle(ray: &Ray3, a: Point3, b: Point3, c: Point3) -> RayHit {
    let edge1 = b - a;
    let edge2 = c - a;
    let pvec = ray.direction.cross(&edge2);
    let det = edge1.dot(&pvec);

    if det.abs() <= EPS_PARALLEL {
        return RayHit::Miss;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - a;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return RayHit::Miss;
    }

    let qvec = tvec.cross(&edge1);
    let v = ray.direction.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return RayHit::Miss;
    }

    let t = edge2.dot(&qvec) * inv_det;
    if t <= EPS_PARALLEL || t > ray.max_distance {
        return RayHit::Miss;
    }

    let mut normal = edge1.cross(&edge2).normalize();
    if normal.dot(&ray.direction) > 0.0 {
        normal = -normal;
    }

    RayHit::Hit {
        t,
        point: ray.point_at(t),
        normal,
    }
}

/// Slab-method ray-vs-AABB intersection, reporting the entry point and the
/// outward normal of the face entered.
pub fn ray_vs_aabb(ray: &Ray3, aabb: &Aabb) -> RayHit {
    let mut t_min = 0.0_f32;
    let mut t_max = ray.max_distance;
    let mut hit_axis = 0usize;
    let mut hit_sign = -1.0_f32;

    let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
    let dir = [ray.direction.x, ray.direction.y, ray.direction.z];
    let min = [aabb.min.x, aabb.min.y, aabb.min.z];
    let max = [aabb.max.x, aabb.max.y, aabb.max.z];

    for axis in 0..3 {
        if dir[axis].abs() < EPS_PARALLEL {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return RayHit::Miss;
            }
            continue;
        }
        let inv_d = 1.0 / dir[axis];
        let mut t1 = (min[axis] - origin[axis]) * inv_d;
        let mut t2 = (max[axis] - origin[axis]) * inv_d;
        let mut sign = -1.0;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            sign = 1.0;
        }
        if t1 > t_min {
            t_min = t1;
            hit_axis = axis;
            hit_sign = sign;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return RayHit::Miss;
        }
    }

    let mut normal = Vector3::zeros();
    normal[hit_axis] = hit_sign;

    RayHit::Hit {
        t: t_min,
        point: ray.point_at(t_min),
        normal,
    }
}

/// Separating-axis overlap test between an AABB and an oriented box,
/// projected onto world-space axis `n`.
///
/// Projects the center-to-center delta onto `n`, the AABB's half-extents
/// with `sum(|n_i| * h_a_i)`, and the OBB's half-extents with
/// `sum(|n . R_j| * h_b_j)` where `R_j` is column `j` of the OBB's
/// orientation matrix. Returns the penetration along `n`; a negative
/// result means the boxes are separated along this axis.
pub fn sat_axis_overlap(
    aabb_center: Point3,
    aabb_half_extents: Vector3,
    obb_center: Point3,
    obb_half_extents: Vector3,
    obb_orientation: &Matrix3,
    axis: Vector3,
) -> f32 {
    let n = axis.normalize();
    let delta = obb_center - aabb_center;
    let separation = delta.dot(&n).abs();

    let aabb_projection =
        n.x.abs() * aabb_half_extents.x + n.y.abs() * aabb_half_extents.y + n.z.abs() * aabb_half_extents.z;

    let obb_projection = (0..3)
        .map(|j| n.dot(&obb_orientation.column(j).into_owned()).abs() * axis_component(obb_half_extents, j))
        .sum::<f32>();

    (aabb_projection + obb_projection) - separation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_mtv_picks_minimum_axis() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
        let b = Aabb::new(Point3::new(1.9, 0.0, 0.0), Point3::new(3.9, 2.0, 2.0));
        let mtv = aabb_vs_aabb_mtv(&a, &b).expect("overlapping");
        assert!((mtv.penetration - 0.1).abs() < 1e-5);
        assert!(mtv.axis.x > 0.0);
    }

    #[test]
    fn no_mtv_when_disjoint() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        assert!(aabb_vs_aabb_mtv(&a, &b).is_none());
    }

    #[test]
    fn closest_point_on_segment_clamps_to_endpoints() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let p = Point3::new(5.0, 1.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, p), b);
    }

    #[test]
    fn closest_point_on_triangle_face_region() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let p = Point3::new(0.25, 0.25, 1.0);
        let cp = closest_point_on_triangle(a, b, c, p);
        assert!((cp.z).abs() < 1e-5);
        assert!((cp.x - 0.25).abs() < 1e-5);
        assert!((cp.y - 0.25).abs() < 1e-5);
    }

    #[test]
    fn closest_point_on_triangle_vertex_region() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let p = Point3::new(-1.0, -1.0, 0.0);
        assert_eq!(closest_point_on_triangle(a, b, c, p), a);
    }

    #[test]
    fn ray_vs_triangle_hits_center() {
        let a = Point3::new(-1.0, -1.0, 0.0);
        let b = Point3::new(1.0, -1.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let ray = Ray3::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0), 100.0);
        let hit = ray_vs_triangle(&ray, a, b, c);
        assert!(hit.is_hit());
        assert_eq!(hit.t(), Some(5.0));
    }

    #[test]
    fn ray_vs_triangle_misses_outside_bounds() {
        let a = Point3::new(-1.0, -1.0, 0.0);
        let b = Point3::new(1.0, -1.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let ray = Ray3::new(Point3::new(10.0, 10.0, 5.0), Vector3::new(0.0, 0.0, -1.0), 100.0);
        assert_eq!(ray_vs_triangle(&ray, a, b, c), RayHit::Miss);
    }

    #[test]
    fn ray_vs_aabb_hits_near_face() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray3::new(Point3::new(-5.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 100.0);
        let hit = ray_vs_aabb(&ray, &aabb);
        assert!(hit.is_hit());
        assert_eq!(hit.t(), Some(4.0));
    }

    #[test]
    fn ray_vs_aabb_misses_when_parallel_and_outside() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray3::new(Point3::new(-5.0, 5.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 100.0);
        assert_eq!(ray_vs_aabb(&ray, &aabb), RayHit::Miss);
    }

    #[test]
    fn ray_vs_aabb_matches_literal_scenario_three() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray3::new(Point3::new(-2.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 10.0);
        let hit = ray_vs_aabb(&ray, &aabb);
        let RayHit::Hit { t, point, normal } = hit else {
            panic!("expected a hit");
        };
        assert!((t - 1.0).abs() < 1e-5);
        assert!((point - Point3::new(-1.0, 0.0, 0.0)).norm() < 1e-5);
        assert_eq!(normal, Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn sat_axis_overlap_detects_separation() {
        let aabb_center = Point3::new(0.0, 0.0, 0.0);
        let aabb_half = Vector3::new(1.0, 1.0, 1.0);
        let obb_center = Point3::new(10.0, 0.0, 0.0);
        let obb_half = Vector3::new(1.0, 1.0, 1.0);
        let orientation = Matrix3::identity();
        let overlap = sat_axis_overlap(
            aabb_center,
            aabb_half,
            obb_center,
            obb_half,
            &orientation,
            Vector3::new(1.0, 0.0, 0.0),
        );
        assert!(overlap < 0.0);
    }
}

//! Canonical pair implementations.
//!
//! Each function here implements exactly one unordered shape pair in the
//! ordinal order fixed by `ShapeTag::ordinal` (sphere first, heightmap
//! last); `dispatch_canonical` is only ever called with arguments already
//! in that order, and `super::detect_collision` derives the reverse order
//! by negating the normal.

use crate::geom::{self, Aabb};
use crate::math::{Point3, Vector3, EPS_PARALLEL};
use crate::shape::{BoxShape, Capsule, ConvexHull, Heightmap, OrientedBox, Shape, Sphere, TriangleMesh};

use super::sat::obb_obb_sat;
use super::{Contact, ContactResult};

/// Penetration depth reported by the documented AABB-level
/// approximations (hull-hull, hull-box, hull-OBB) and by every mesh-X
/// pair's single-triangle contact: a constant small penetration rather
/// than a true closest-feature depth.
const APPROX_PENETRATION: f32 = 0.1;

pub(super) fn dispatch_canonical(a: &Shape, b: &Shape) -> ContactResult {
    use Shape::*;
    match (a, b) {
        (Sphere(s1), Sphere(s2)) => sphere_sphere(s1, s2),
        (Sphere(s), Box(bx)) => sphere_box(s, bx),
        (Sphere(s), OrientedBox(o)) => sphere_obb(s, o),
        (Sphere(s), Capsule(c)) => sphere_capsule(s, c),
        (Sphere(s), ConvexHull(h)) => sphere_hull(s, h),
        (Sphere(s), TriangleMesh(m)) => sphere_mesh(s, m),
        (Sphere(s), Heightmap(h)) => sphere_heightmap(s, h),

        (Box(b1), Box(b2)) => box_box(b1, b2),
        (Box(bx), OrientedBox(o)) => box_obb(bx, o),
        (Box(bx), Capsule(c)) => box_capsule(bx, c),
        (Box(bx), ConvexHull(h)) => box_hull_approx(bx, h),
        (Box(bx), TriangleMesh(m)) => box_mesh(bx, m),
        (Box(bx), Heightmap(h)) => box_heightmap(bx, h),

        (OrientedBox(o1), OrientedBox(o2)) => obb_obb(o1, o2),
        (OrientedBox(o), Capsule(c)) => obb_capsule(o, c),
        (OrientedBox(o), ConvexHull(h)) => obb_hull_approx(o, h),
        (OrientedBox(o), TriangleMesh(m)) => obb_mesh(o, m),
        (OrientedBox(o), Heightmap(h)) => obb_heightmap(o, h),

        (Capsule(c1), Capsule(c2)) => capsule_capsule(c1, c2),
        (Capsule(c), ConvexHull(h)) => capsule_hull(c, h),
        (Capsule(c), TriangleMesh(m)) => capsule_mesh(c, m),
        (Capsule(c), Heightmap(h)) => capsule_heightmap(c, h),

        (ConvexHull(h1), ConvexHull(h2)) => hull_hull_approx(h1, h2),
        (ConvexHull(h), TriangleMesh(m)) => hull_mesh(h, m),
        (ConvexHull(h), Heightmap(hm)) => hull_heightmap(h, hm),

        (TriangleMesh(m1), TriangleMesh(m2)) => mesh_mesh(m1, m2),
        (TriangleMesh(m), Heightmap(h)) => mesh_heightmap(m, h),

        (Heightmap(_), Heightmap(_)) => ContactResult::NoCollision,

        _ => unreachable!("dispatch_canonical requires ordinal(a) <= ordinal(b)"),
    }
}

fn unit_or_fallback(v: Vector3, fallback: Vector3) -> Vector3 {
    if v.norm_squared() < EPS_PARALLEL {
        fallback
    } else {
        v.normalize()
    }
}

fn sphere_sphere(s1: &Sphere, s2: &Sphere) -> ContactResult {
    let delta = s2.center - s1.center;
    let d = delta.norm();
    if d > s1.radius + s2.radius {
        return ContactResult::NoCollision;
    }
    let normal = unit_or_fallback(delta, Vector3::new(1.0, 0.0, 0.0));
    ContactResult::Collision(Contact {
        point: s1.center + normal * s1.radius,
        normal,
        penetration: s1.radius + s2.radius - d,
    })
}

fn sphere_box(s: &Sphere, bx: &BoxShape) -> ContactResult {
    let q = bx.aabb().closest_point(s.center);
    let delta = s.center - q;
    let d = delta.norm();
    if d > s.radius {
        return ContactResult::NoCollision;
    }
    let normal = if d > EPS_PARALLEL {
        delta / d
    } else {
        geom::closest_face_normal(bx.half_extents, s.center - bx.center.coords)
    };
    ContactResult::Collision(Contact {
        point: q,
        normal,
        penetration: s.radius - d,
    })
}

fn sphere_obb(s: &Sphere, o: &OrientedBox) -> ContactResult {
    let local_c = o.world_to_local_point(s.center);
    let clamped_local = Point3::new(
        local_c.x.clamp(-o.half_extents.x, o.half_extents.x),
        local_c.y.clamp(-o.half_extents.y, o.half_extents.y),
        local_c.z.clamp(-o.half_extents.z, o.half_extents.z),
    );
    let delta_local = local_c - clamped_local;
    let d = delta_local.norm();
    if d > s.radius {
        return ContactResult::NoCollision;
    }
    let normal_local = if d > EPS_PARALLEL {
        delta_local / d
    } else {
        o.closest_face_normal_local(local_c)
    };
    ContactResult::Collision(Contact {
        point: o.local_to_world_point(clamped_local),
        normal: o.local_to_world_vector(normal_local),
        penetration: s.radius - d,
    })
}

fn sphere_capsule(s: &Sphere, c: &Capsule) -> ContactResult {
    let q = c.closest_point_on_segment(s.center);
    let delta = s.center - q;
    let d = delta.norm();
    if d > s.radius + c.radius {
        return ContactResult::NoCollision;
    }
    let axis_fallback = unit_or_fallback(c.endpoint2 - c.endpoint1, Vector3::new(1.0, 0.0, 0.0));
    let normal = unit_or_fallback(delta, axis_fallback);
    let t = c.radius / (s.radius + c.radius);
    ContactResult::Collision(Contact {
        point: q + delta * t,
        normal,
        penetration: s.radius + c.radius - d,
    })
}

/// Contact-point coordinate along one axis: the overlap region's face on
/// the side the MTV normal points toward, when `axis_component` is that
/// axis's (nonzero) normal component; otherwise the middle of the overlap
/// on this axis. Exactly one axis is the separating axis for an AABB-AABB
/// MTV, so this resolves to the overlap-rectangle middle on the other two.
fn contact_coord(overlap_min: f32, overlap_max: f32, axis_component: f32) -> f32 {
    if axis_component > 0.0 {
        overlap_max
    } else if axis_component < 0.0 {
        overlap_min
    } else {
        (overlap_min + overlap_max) * 0.5
    }
}

fn box_box(b1: &BoxShape, b2: &BoxShape) -> ContactResult {
    let mtv = geom::aabb_vs_aabb_mtv(&b1.aabb(), &b2.aabb());
    let Some(mtv) = mtv else {
        return ContactResult::NoCollision;
    };
    let overlap = Aabb::new(
        Point3::new(
            b1.aabb().min.x.max(b2.aabb().min.x),
            b1.aabb().min.y.max(b2.aabb().min.y),
            b1.aabb().min.z.max(b2.aabb().min.z),
        ),
        Point3::new(
            b1.aabb().max.x.min(b2.aabb().max.x),
            b1.aabb().max.y.min(b2.aabb().max.y),
            b1.aabb().max.z.min(b2.aabb().max.z),
        ),
    );
    let point = Point3::new(
        contact_coord(overlap.min.x, overlap.max.x, mtv.axis.x),
        contact_coord(overlap.min.y, overlap.max.y, mtv.axis.y),
        contact_coord(overlap.min.z, overlap.max.z, mtv.axis.z),
    );
    ContactResult::Collision(Contact {
        point,
        normal: mtv.axis,
        penetration: mtv.penetration,
    })
}

fn world_axes() -> [Vector3; 3] {
    [Vector3::x(), Vector3::y(), Vector3::z()]
}

fn box_obb(bx: &BoxShape, o: &OrientedBox) -> ContactResult {
    let result = obb_obb_sat(
        o.center - bx.center,
        bx.half_extents,
        world_axes(),
        o.half_extents,
        [
            o.orientation.column(0).into_owned(),
            o.orientation.column(1).into_owned(),
            o.orientation.column(2).into_owned(),
        ],
    );
    let Some(result) = result else {
        return ContactResult::NoCollision;
    };
    let midpoint = nalgebra::center(&bx.center, &o.center);
    ContactResult::Collision(Contact {
        point: midpoint + result.normal * (result.penetration * 0.5),
        normal: result.normal,
        penetration: result.penetration,
    })
}

fn obb_obb(o1: &OrientedBox, o2: &OrientedBox) -> ContactResult {
    let result = obb_obb_sat(
        o2.center - o1.center,
        o1.half_extents,
        [
            o1.orientation.column(0).into_owned(),
            o1.orientation.column(1).into_owned(),
            o1.orientation.column(2).into_owned(),
        ],
        o2.half_extents,
        [
            o2.orientation.column(0).into_owned(),
            o2.orientation.column(1).into_owned(),
            o2.orientation.column(2).into_owned(),
        ],
    );
    let Some(result) = result else {
        return ContactResult::NoCollision;
    };
    let midpoint = nalgebra::center(&o1.center, &o2.center);
    ContactResult::Collision(Contact {
        point: midpoint + result.normal * (result.penetration * 0.5),
        normal: result.normal,
        penetration: result.penetration,
    })
}

/// Shared core for AABB-vs-capsule and OBB-vs-capsule: both transform the
/// capsule endpoints into the box's local frame (the identity transform
/// for an axis-aligned box) and then run the same closest-point
/// reduction.
fn box_capsule_core(
    half_extents: Vector3,
    local_p1: Point3,
    local_p2: Point3,
    radius: f32,
) -> Option<(Point3, Vector3, f32)> {
    let origin = Point3::origin();
    let q_seg = geom::closest_point_on_segment(local_p1, local_p2, origin);
    let q_box = Point3::new(
        q_seg.x.clamp(-half_extents.x, half_extents.x),
        q_seg.y.clamp(-half_extents.y, half_extents.y),
        q_seg.z.clamp(-half_extents.z, half_extents.z),
    );
    let delta = q_seg - q_box;
    let d = delta.norm();
    if d > radius {
        return None;
    }
    let normal = if d > EPS_PARALLEL {
        delta / d
    } else {
        geom::closest_face_normal(half_extents, q_seg)
    };
    Some((q_box, normal, radius - d))
}

fn box_capsule(bx: &BoxShape, c: &Capsule) -> ContactResult {
    let local_p1 = c.endpoint1 - bx.center.coords;
    let local_p2 = c.endpoint2 - bx.center.coords;
    match box_capsule_core(bx.half_extents, local_p1, local_p2, c.radius) {
        None => ContactResult::NoCollision,
        Some((q_box, normal, penetration)) => ContactResult::Collision(Contact {
            point: bx.center + q_box.coords,
            normal,
            penetration,
        }),
    }
}

fn obb_capsule(o: &OrientedBox, c: &Capsule) -> ContactResult {
    let local_p1 = o.world_to_local_point(c.endpoint1);
    let local_p2 = o.world_to_local_point(c.endpoint2);
    match box_capsule_core(o.half_extents, local_p1, local_p2, c.radius) {
        None => ContactResult::NoCollision,
        Some((q_box, normal, penetration)) => ContactResult::Collision(Contact {
            point: o.local_to_world_point(q_box),
            normal: o.local_to_world_vector(normal),
            penetration,
        }),
    }
}

fn capsule_capsule(c1: &Capsule, c2: &Capsule) -> ContactResult {
    let (p1, p2) = geom::closest_points_segment_segment(
        c1.endpoint1,
        c1.endpoint2,
        c2.endpoint1,
        c2.endpoint2,
    );
    let delta = p2 - p1;
    let d = delta.norm();
    if d > c1.radius + c2.radius {
        return ContactResult::NoCollision;
    }
    let normal = unit_or_fallback(delta, Vector3::new(1.0, 0.0, 0.0));
    ContactResult::Collision(Contact {
        point: p1 + normal * c1.radius,
        normal,
        penetration: c1.radius + c2.radius - d,
    })
}

/// Shared "AABB overlap + center-to-center fallback" approximation used
/// by the hull pairs flagged as documented simplifications in the
/// specification's design notes.
fn aabb_overlap_fallback_contact(
    aabb1: &Aabb,
    center1: Point3,
    aabb2: &Aabb,
    center2: Point3,
) -> ContactResult {
    if !geom::aabb_overlap(aabb1, aabb2) {
        return ContactResult::NoCollision;
    }
    let normal = unit_or_fallback(center2 - center1, Vector3::new(1.0, 0.0, 0.0));
    ContactResult::Collision(Contact {
        point: nalgebra::center(&center1, &center2),
        normal,
        penetration: APPROX_PENETRATION,
    })
}

fn box_hull_approx(bx: &BoxShape, h: &ConvexHull) -> ContactResult {
    aabb_overlap_fallback_contact(&bx.aabb(), bx.center, &h.aabb(), h.centroid)
}

fn obb_hull_approx(o: &OrientedBox, h: &ConvexHull) -> ContactResult {
    aabb_overlap_fallback_contact(&o.aabb(), o.center, &h.aabb(), h.centroid)
}

fn hull_hull_approx(h1: &ConvexHull, h2: &ConvexHull) -> ContactResult {
    aabb_overlap_fallback_contact(&h1.aabb(), h1.centroid, &h2.aabb(), h2.centroid)
}

/// Closest point on any face of `h` to `p`, scanning every face's
/// triangle with `closest_point_on_triangle`.
fn closest_point_on_hull_surface(h: &ConvexHull, p: Point3) -> Option<Point3> {
    h.faces()
        .iter()
        .map(|face| {
            let v = h.vertices();
            geom::closest_point_on_triangle(
                v[face.indices[0]],
                v[face.indices[1]],
                v[face.indices[2]],
                p,
            )
        })
        .min_by(|a, b| {
            (*a - p)
                .norm_squared()
                .partial_cmp(&(*b - p).norm_squared())
                .expect("distances are finite")
        })
}

/// Core of sphere-vs-hull, reused by capsule-vs-hull against a virtual
/// sphere centered at the capsule's closest point to the hull centroid.
fn sphere_like_hull_contact(center: Point3, radius: f32, h: &ConvexHull) -> ContactResult {
    if h.faces().is_empty() {
        return ContactResult::NoCollision;
    }
    if h.contains_point(center) {
        let (face, dist_to_plane) = h.nearest_face(center).expect("hull has faces");
        return ContactResult::Collision(Contact {
            point: center - face.normal * dist_to_plane,
            normal: face.normal,
            penetration: dist_to_plane + radius,
        });
    }
    let Some(closest) = closest_point_on_hull_surface(h, center) else {
        return ContactResult::NoCollision;
    };
    let delta = center - closest;
    let d = delta.norm();
    if d > radius {
        return ContactResult::NoCollision;
    }
    let normal = if d > EPS_PARALLEL {
        delta / d
    } else {
        h.nearest_face(center).map(|(f, _)| f.normal).unwrap_or(Vector3::new(1.0, 0.0, 0.0))
    };
    ContactResult::Collision(Contact {
        point: closest,
        normal,
        penetration: radius - d,
    })
}

fn sphere_hull(s: &Sphere, h: &ConvexHull) -> ContactResult {
    sphere_like_hull_contact(s.center, s.radius, h)
}

fn capsule_hull(c: &Capsule, h: &ConvexHull) -> ContactResult {
    let q = c.closest_point_on_segment(h.centroid);
    sphere_like_hull_contact(q, c.radius, h)
}

/// Shared core for every mesh-X pair: the first candidate triangle
/// (selected by the caller's region query) becomes the contact, via the
/// triangle's centroid and face normal, at the documented constant
/// penetration depth.
fn mesh_triangle_contact(m: &TriangleMesh, candidates: &[usize], shape1_center: Point3) -> ContactResult {
    let Some(&idx) = candidates.first() else {
        return ContactResult::NoCollision;
    };
    let [a, b, c] = m.triangle_vertices(idx);
    let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
    let mut normal = (b - a).cross(&(c - a));
    normal = unit_or_fallback(normal, Vector3::new(0.0, 1.0, 0.0));
    if normal.dot(&(shape1_center - centroid)) < 0.0 {
        normal = -normal;
    }
    ContactResult::Collision(Contact {
        point: centroid,
        normal,
        penetration: APPROX_PENETRATION,
    })
}

fn sphere_mesh(s: &Sphere, m: &TriangleMesh) -> ContactResult {
    let candidates = m.triangles_intersecting_sphere(s.center, s.radius);
    mesh_triangle_contact(m, &candidates, s.center)
}

fn box_mesh(bx: &BoxShape, m: &TriangleMesh) -> ContactResult {
    let candidates = m.triangles_in_aabb(&bx.aabb());
    mesh_triangle_contact(m, &candidates, bx.center)
}

fn obb_mesh(o: &OrientedBox, m: &TriangleMesh) -> ContactResult {
    let candidates = m.triangles_in_aabb(&o.aabb());
    mesh_triangle_contact(m, &candidates, o.center)
}

/// Reduces the capsule to its center point rather than testing the full
/// segment against candidate triangles; carried over unchanged rather than
/// guessed at.
fn capsule_mesh(c: &Capsule, m: &TriangleMesh) -> ContactResult {
    let candidates = m.triangles_in_aabb(&c.aabb());
    mesh_triangle_contact(m, &candidates, c.center())
}

fn hull_mesh(h: &ConvexHull, m: &TriangleMesh) -> ContactResult {
    let candidates = m.triangles_in_aabb(&h.aabb());
    mesh_triangle_contact(m, &candidates, h.centroid)
}

fn mesh_mesh(m1: &TriangleMesh, m2: &TriangleMesh) -> ContactResult {
    for idx2 in 0..m2.triangles().len() {
        let [a, b, c] = m2.triangle_vertices(idx2);
        let Some(tri_aabb) = Aabb::from_points(&[a, b, c]) else {
            continue;
        };
        let candidates = m1.triangles_in_aabb(&tri_aabb);
        if !candidates.is_empty() {
            let centroid2 = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            return mesh_triangle_contact(m1, &candidates, centroid2);
        }
    }
    ContactResult::NoCollision
}

/// Shared core for every heightmap-X pair: samples a handful of points on
/// the lower surface of `X`, reports the deepest one below the terrain
/// (if any) using the terrain's own bilinear surface normal.
fn heightmap_contact(samples: &[Point3], hm: &Heightmap) -> ContactResult {
    let mut deepest: Option<(Point3, f32)> = None;
    for &p in samples {
        let terrain_height = hm.height_at(p.x, p.z);
        let depth = terrain_height - p.y;
        if depth > 0.0 && deepest.map_or(true, |(_, best)| depth > best) {
            deepest = Some((p, depth));
        }
    }
    match deepest {
        None => ContactResult::NoCollision,
        Some((p, depth)) => {
            let normal = hm.normal_at(p.x, p.z);
            ContactResult::Collision(Contact {
                point: Point3::new(p.x, hm.height_at(p.x, p.z), p.z),
                normal,
                penetration: depth,
            })
        }
    }
}

fn sphere_heightmap(s: &Sphere, h: &Heightmap) -> ContactResult {
    let sample = s.center - Vector3::new(0.0, s.radius, 0.0);
    heightmap_contact(&[sample], h)
}

fn box_heightmap(bx: &BoxShape, h: &Heightmap) -> ContactResult {
    let aabb = bx.aabb();
    let samples = [
        Point3::new(aabb.min.x, aabb.min.y, aabb.min.z),
        Point3::new(aabb.max.x, aabb.min.y, aabb.min.z),
        Point3::new(aabb.min.x, aabb.min.y, aabb.max.z),
        Point3::new(aabb.max.x, aabb.min.y, aabb.max.z),
    ];
    heightmap_contact(&samples, h)
}

fn obb_heightmap(o: &OrientedBox, h: &Heightmap) -> ContactResult {
    let aabb = o.aabb();
    let samples = [
        Point3::new(aabb.min.x, aabb.min.y, aabb.min.z),
        Point3::new(aabb.max.x, aabb.min.y, aabb.min.z),
        Point3::new(aabb.min.x, aabb.min.y, aabb.max.z),
        Point3::new(aabb.max.x, aabb.min.y, aabb.max.z),
    ];
    heightmap_contact(&samples, h)
}

fn capsule_heightmap(c: &Capsule, h: &Heightmap) -> ContactResult {
    let samples = [
        c.endpoint1 - Vector3::new(0.0, c.radius, 0.0),
        c.endpoint2 - Vector3::new(0.0, c.radius, 0.0),
    ];
    heightmap_contact(&samples, h)
}

fn hull_heightmap(h: &ConvexHull, hm: &Heightmap) -> ContactResult {
    heightmap_contact(h.vertices(), hm)
}

fn mesh_heightmap(m: &TriangleMesh, h: &Heightmap) -> ContactResult {
    heightmap_contact(m.vertices(), h)
}

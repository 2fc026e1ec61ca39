//! Property-based tests for the quantified invariants: normal symmetry,
//! AABB conservativeness, support correctness, cells(Q) coverage, and
//! range-query soundness/completeness.

use collider3d::prelude::*;
use proptest::prelude::*;

fn finite_coord() -> impl Strategy<Value = f32> {
    -50.0f32..50.0
}

fn positive_radius() -> impl Strategy<Value = f32> {
    0.1f32..5.0
}

fn point3_strategy() -> impl Strategy<Value = Point3> {
    (finite_coord(), finite_coord(), finite_coord()).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn vector3_strategy() -> impl Strategy<Value = Vector3> {
    (finite_coord(), finite_coord(), finite_coord())
        .prop_map(|(x, y, z)| Vector3::new(x, y, z))
        .prop_filter("non-zero direction", |v| v.norm() > 1e-4)
}

fn sphere_strategy() -> impl Strategy<Value = Sphere> {
    (point3_strategy(), positive_radius()).prop_map(|(c, r)| Sphere::new(c, r).unwrap())
}

fn box_strategy() -> impl Strategy<Value = BoxShape> {
    (point3_strategy(), positive_radius(), positive_radius(), positive_radius())
        .prop_map(|(c, hx, hy, hz)| BoxShape::new(c, Vector3::new(hx, hy, hz)).unwrap())
}

proptest! {
    #[test]
    fn sphere_sphere_normal_symmetry(a in sphere_strategy(), b in sphere_strategy()) {
        let sa = Shape::Sphere(a);
        let sb = Shape::Sphere(b);
        let forward = detect_collision(&sa, &sb);
        let backward = detect_collision(&sb, &sa);
        if let (Some(f), Some(bwd)) = (forward.contact(), backward.contact()) {
            prop_assert!((f.normal + bwd.normal).norm() < 1e-3);
            prop_assert!((f.penetration - bwd.penetration).abs() < 1e-3);
        } else {
            prop_assert_eq!(forward.collides(), backward.collides());
        }
    }

    #[test]
    fn box_box_normal_symmetry(a in box_strategy(), b in box_strategy()) {
        let sa = Shape::Box(a);
        let sb = Shape::Box(b);
        let forward = detect_collision(&sa, &sb);
        let backward = detect_collision(&sb, &sa);
        if let (Some(f), Some(bwd)) = (forward.contact(), backward.contact()) {
            prop_assert!((f.normal + bwd.normal).norm() < 1e-3);
            prop_assert!((f.penetration - bwd.penetration).abs() < 1e-3);
        } else {
            prop_assert_eq!(forward.collides(), backward.collides());
        }
    }

    #[test]
    fn sphere_aabb_contains_center_plus_radius_samples(s in sphere_strategy(), d in vector3_strategy()) {
        let shape = Shape::Sphere(s);
        let surface_point = s.center + d.normalize() * s.radius;
        prop_assert!(shape.aabb().contains_point(surface_point));
    }

    #[test]
    fn box_aabb_contains_its_own_corners(b in box_strategy()) {
        let shape = Shape::Box(b);
        for sx in [-1.0f32, 1.0] {
            for sy in [-1.0f32, 1.0] {
                for sz in [-1.0f32, 1.0] {
                    let corner = b.center
                        + Vector3::new(sx * b.half_extents.x, sy * b.half_extents.y, sz * b.half_extents.z);
                    prop_assert!(shape.aabb().contains_point(corner));
                }
            }
        }
    }

    #[test]
    fn sphere_support_dominates_every_sampled_surface_point(
        s in sphere_strategy(),
        d in vector3_strategy(),
        sample_dir in vector3_strategy(),
    ) {
        let shape = Shape::Sphere(s);
        let d = d.normalize();
        let support = shape.support(d);
        let v = s.center + sample_dir.normalize() * s.radius;
        prop_assert!(d.dot(&support.coords) >= d.dot(&v.coords) - 1e-3);
    }

    #[test]
    fn box_support_dominates_every_corner(b in box_strategy(), d in vector3_strategy()) {
        let shape = Shape::Box(b);
        let d = d.normalize();
        let support = shape.support(d);
        for sx in [-1.0f32, 1.0] {
            for sy in [-1.0f32, 1.0] {
                for sz in [-1.0f32, 1.0] {
                    let corner = b.center
                        + Vector3::new(sx * b.half_extents.x, sy * b.half_extents.y, sz * b.half_extents.z);
                    prop_assert!(d.dot(&support.coords) >= d.dot(&corner.coords) - 1e-3);
                }
            }
        }
    }

    #[test]
    fn cells_in_region_intervals_are_sorted_and_non_adjacent(
        x0 in 0i64..20, y0 in 0i64..20, z0 in 0i64..20,
        dx in 1i64..6, dy in 1i64..6, dz in 1i64..6,
    ) {
        let grid = MortonGrid { origin: Point3::origin(), root_extent: 1024.0 };
        let level = 5u8;
        let cell = grid.length_at_level(level);
        let region = Aabb::new(
            Point3::new(x0 as f32 * cell, y0 as f32 * cell, z0 as f32 * cell),
            Point3::new((x0 + dx) as f32 * cell, (y0 + dy) as f32 * cell, (z0 + dz) as f32 * cell),
        );
        let intervals = grid.cells_in_region(&region, level, 64);
        for w in intervals.windows(2) {
            prop_assert!(w[0].end + 1 < w[1].start);
        }
    }

    #[test]
    fn query_range_returns_exactly_entities_overlapping_region(
        points in proptest::collection::vec(point3_strategy(), 1..30),
    ) {
        let grid = MortonGrid { origin: Point3::new(-100.0, -100.0, -100.0), root_extent: 4096.0 };
        let mut index = SpatialIndex::new(grid, ColliderConfig::default());
        for (i, p) in points.iter().enumerate() {
            index.insert_point(i as u64, *p, 8).unwrap();
        }
        let region = Aabb::new(Point3::new(-10.0, -10.0, -10.0), Point3::new(10.0, 10.0, 10.0));

        let expected: Vec<u64> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| region.contains_point(**p))
            .map(|(i, _)| i as u64)
            .collect();
        let mut got = index.query_range(&region);
        got.sort_unstable();
        let mut expected_sorted = expected;
        expected_sorted.sort_unstable();
        prop_assert_eq!(got, expected_sorted);
    }

    #[test]
    fn knn_returns_k_closest_ordered_by_distance(
        points in proptest::collection::vec(point3_strategy(), 5..30),
        query in point3_strategy(),
    ) {
        let grid = MortonGrid { origin: Point3::new(-100.0, -100.0, -100.0), root_extent: 4096.0 };
        let mut index = SpatialIndex::new(grid, ColliderConfig::default());
        for (i, p) in points.iter().enumerate() {
            index.insert_point(i as u64, *p, 8).unwrap();
        }
        let k = 3usize.min(points.len());
        let got = index.query_knn(query, k);
        prop_assert_eq!(got.len(), k);

        let mut by_distance: Vec<(u64, f32)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u64, (*p - query).norm()))
            .collect();
        by_distance.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
        let expected_kth_distance = by_distance[k - 1].1;
        let got_max_distance = got
            .iter()
            .map(|id| (points[*id as usize] - query).norm())
            .fold(0.0f32, f32::max);
        prop_assert!(got_max_distance <= expected_kth_distance + 1e-3);
    }
}

//! Narrow-phase pair dispatcher.
//!
//! Symmetric dispatch over the seven shape tags: for every unordered pair
//! there is exactly one canonical ordered implementation (grounded in
//! `pairs.rs`), and the reverse order is derived by negating the contact
//! normal. Canonical order is the shape tag's ordinal
//! (`ShapeTag::ordinal`): sphere is always first against every other
//! shape, then box, then OBB, then capsule, then hull, then mesh, then
//! heightmap, extending the "sphere first" rule into a total order over
//! all seven tags.

mod pairs;
mod sat;

pub use sat::{obb_obb_sat, SatResult};

use crate::math::{Point3, Vector3};
use crate::shape::{Shape, ShapeTag};

/// A single-point contact manifold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// World-space contact point.
    pub point: Point3,
    /// Unit normal, pointing from shape1 toward shape2 at shape1's
    /// surface.
    pub normal: Vector3,
    /// Penetration depth, always `> 0`.
    pub penetration: f32,
}

/// Result of a pairwise narrow-phase test: either no contact, or a single
/// contact manifold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactResult {
    /// The shapes do not overlap.
    NoCollision,
    /// The shapes overlap at `Contact`.
    Collision(Contact),
}

impl ContactResult {
    /// `true` if this is a `Collision`.
    pub fn collides(&self) -> bool {
        matches!(self, ContactResult::Collision(_))
    }

    /// The contact, if any.
    pub fn contact(&self) -> Option<&Contact> {
        match self {
            ContactResult::Collision(c) => Some(c),
            ContactResult::NoCollision => None,
        }
    }
}

/// Returns `r` unchanged if it is `NoCollision`; otherwise negates the
/// contact normal, leaving `contactPoint` and `penetrationDepth`
/// unchanged. Used to derive the reverse-order result from a canonical
/// pair implementation.
pub fn flip_normal(r: ContactResult) -> ContactResult {
    match r {
        ContactResult::NoCollision => ContactResult::NoCollision,
        ContactResult::Collision(c) => ContactResult::Collision(Contact {
            normal: -c.normal,
            ..c
        }),
    }
}

impl ShapeTag {
    fn ordinal(self) -> u8 {
        match self {
            ShapeTag::Sphere => 0,
            ShapeTag::Box => 1,
            ShapeTag::OrientedBox => 2,
            ShapeTag::Capsule => 3,
            ShapeTag::ConvexHull => 4,
            ShapeTag::TriangleMesh => 5,
            ShapeTag::Heightmap => 6,
        }
    }
}

/// Total function over the 7x7 shape-pair matrix: detects whether
/// `shape1` and `shape2` collide and, if so, the resulting contact
/// manifold.
///
/// Never panics and never returns an error; unimplemented-pair cases
/// (there should be none) fall back to `NoCollision` rather than
/// propagating a `Result` through the hot path.
pub fn detect_collision(shape1: &Shape, shape2: &Shape) -> ContactResult {
    if shape1.tag().ordinal() <= shape2.tag().ordinal() {
        pairs::dispatch_canonical(shape1, shape2)
    } else {
        flip_normal(pairs::dispatch_canonical(shape2, shape1))
    }
}

/// Narrow-phase sweep over every unordered pair in `shapes`, returning the
/// index pair and contact for every pair that collides.
///
/// Uses `rayon`'s data-parallel iterators when the `parallel` feature is
/// enabled (the default); falls back to a sequential double loop
/// otherwise. Intended for the broad-phase candidate list a caller has
/// already narrowed via [`crate::index::SpatialIndex::query_range`] rather
/// than the full O(n^2) shape list.
#[cfg(feature = "parallel")]
pub fn detect_collisions_parallel(shapes: &[Shape]) -> Vec<(usize, usize, Contact)> {
    use rayon::prelude::*;

    (0..shapes.len())
        .into_par_iter()
        .flat_map(|i| {
            (i + 1..shapes.len())
                .into_par_iter()
                .filter_map(move |j| match detect_collision(&shapes[i], &shapes[j]) {
                    ContactResult::Collision(c) => Some((i, j, c)),
                    ContactResult::NoCollision => None,
                })
        })
        .collect()
}

/// Sequential fallback for [`detect_collisions_parallel`], used when the
/// `parallel` feature is disabled.
#[cfg(not(feature = "parallel"))]
pub fn detect_collisions_parallel(shapes: &[Shape]) -> Vec<(usize, usize, Contact)> {
    let mut out = Vec::new();
    for i in 0..shapes.len() {
        for j in (i + 1)..shapes.len() {
            if let ContactResult::Collision(c) = detect_collision(&shapes[i], &shapes[j]) {
                out.push((i, j, c));
            }
        }
    }
    out
}

/// [`detect_collisions_parallel`] with caller-supplied filter and contact
/// hooks, for callers that need to reject candidate pairs before
/// narrow-phase work runs or react to accepted contacts as they're found.
/// Neither hook performs I/O.
///
/// `reject(id1, id2, content1, content2)` is tested against every candidate
/// pair before `detect_collision` runs on it; a `true` result drops the
/// pair with no further work. `on_contact` is invoked once per accepted
/// contact, in `(i, j)` order, after the sweep completes.
#[cfg(feature = "parallel")]
pub fn detect_collisions_with_hooks<T: Sync>(
    shapes: &[Shape],
    contents: &[T],
    reject: impl Fn(usize, usize, &T, &T) -> bool + Sync,
    mut on_contact: impl FnMut(usize, usize, &Contact),
) -> Vec<(usize, usize, Contact)> {
    use rayon::prelude::*;

    let out: Vec<(usize, usize, Contact)> = (0..shapes.len())
        .into_par_iter()
        .flat_map(|i| {
            let reject = &reject;
            (i + 1..shapes.len()).into_par_iter().filter_map(move |j| {
                if reject(i, j, &contents[i], &contents[j]) {
                    return None;
                }
                match detect_collision(&shapes[i], &shapes[j]) {
                    ContactResult::Collision(c) => Some((i, j, c)),
                    ContactResult::NoCollision => None,
                }
            })
        })
        .collect();

    for (i, j, c) in &out {
        on_contact(*i, *j, c);
    }
    out
}

/// Sequential fallback for [`detect_collisions_with_hooks`], used when the
/// `parallel` feature is disabled.
#[cfg(not(feature = "parallel"))]
pub fn detect_collisions_with_hooks<T: Sync>(
    shapes: &[Shape],
    contents: &[T],
    reject: impl Fn(usize, usize, &T, &T) -> bool + Sync,
    mut on_contact: impl FnMut(usize, usize, &Contact),
) -> Vec<(usize, usize, Contact)> {
    let mut out = Vec::new();
    for i in 0..shapes.len() {
        for j in (i + 1)..shapes.len() {
            if reject(i, j, &contents[i], &contents[j]) {
                continue;
            }
            if let ContactResult::Collision(c) = detect_collision(&shapes[i], &shapes[j]) {
                on_contact(i, j, &c);
                out.push((i, j, c));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Sphere;

    #[test]
    fn reverse_order_matches_flipped_normal() {
        let s1 = Shape::Sphere(Sphere::new(Point3::origin(), 1.0).unwrap());
        let s2 = Shape::Sphere(Sphere::new(Point3::new(1.5, 0.0, 0.0), 1.0).unwrap());

        let forward = detect_collision(&s1, &s2);
        let backward = detect_collision(&s2, &s1);

        let (Some(f), Some(b)) = (forward.contact(), backward.contact()) else {
            panic!("expected both orders to collide");
        };
        assert!((f.normal + b.normal).norm() < 1e-5);
        assert!((f.penetration - b.penetration).abs() < 1e-4);
    }

    #[test]
    fn detect_collisions_parallel_finds_every_overlapping_pair() {
        let shapes = vec![
            Shape::Sphere(Sphere::new(Point3::origin(), 1.0).unwrap()),
            Shape::Sphere(Sphere::new(Point3::new(1.5, 0.0, 0.0), 1.0).unwrap()),
            Shape::Sphere(Sphere::new(Point3::new(50.0, 0.0, 0.0), 1.0).unwrap()),
        ];
        let hits = detect_collisions_parallel(&shapes);
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].0, hits[0].1), (0, 1));
    }

    #[test]
    fn detect_collisions_with_hooks_rejects_filtered_pairs() {
        let shapes = vec![
            Shape::Sphere(Sphere::new(Point3::origin(), 1.0).unwrap()),
            Shape::Sphere(Sphere::new(Point3::new(1.5, 0.0, 0.0), 1.0).unwrap()),
        ];
        // Both shapes tagged "ghost"; the filter rejects any pair where
        // either side is a ghost, so the overlapping pair never reaches
        // narrow-phase.
        let contents = vec!["ghost", "ghost"];
        let hits = detect_collisions_with_hooks(
            &shapes,
            &contents,
            |_, _, c1, c2| *c1 == "ghost" || *c2 == "ghost",
            |_, _, _| panic!("on_contact should not run for a rejected pair"),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn detect_collisions_with_hooks_invokes_callback_per_accepted_contact() {
        let shapes = vec![
            Shape::Sphere(Sphere::new(Point3::origin(), 1.0).unwrap()),
            Shape::Sphere(Sphere::new(Point3::new(1.5, 0.0, 0.0), 1.0).unwrap()),
            Shape::Sphere(Sphere::new(Point3::new(50.0, 0.0, 0.0), 1.0).unwrap()),
        ];
        let contents = vec![(), (), ()];
        let mut seen = Vec::new();
        let hits = detect_collisions_with_hooks(
            &shapes,
            &contents,
            |_, _, _, _| false,
            |i, j, _| seen.push((i, j)),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(seen, vec![(0, 1)]);
    }
}

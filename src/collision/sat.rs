//! Full 15-axis separating-axis test, shared by AABB-vs-OBB and
//! OBB-vs-OBB dispatch.
//!
//! Grounded on `SatAlgorithm::test_collision` (face-normal axes, then edge
//! cross products, tracking the axis of minimum penetration and bailing
//! out the moment any axis separates) but generalized from
//! arbitrary-polyhedron vertex projection to closed-form box projection:
//! each box contributes its own three orthonormal axes with half-extents,
//! so projecting onto axis `n` is `sum(|axis_i . n| * half_i)` rather than
//! a min/max scan over vertices.

use crate::math::Vector3;
use crate::shape::is_degenerate_axis;

/// Outcome of the 15-axis SAT test: the minimum-penetration axis (world
/// space, pointing from box A toward box B) and the penetration depth
/// along it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatResult {
    /// Unit separating axis, oriented from A toward B.
    pub normal: Vector3,
    /// Penetration depth along `normal`.
    pub penetration: f32,
}

/// Runs the 15-axis SAT test between two oriented boxes, given as a
/// center, local-axis half-extents, and the three world-space unit axes
/// of each box (an axis-aligned box simply passes the world x/y/z axes).
///
/// Tests 3 axes of A, 3 axes of B, then the 9 pairwise edge-cross
/// products (skipping any whose squared length is below
/// [`crate::math::EPS_PARALLEL`], i.e. nearly parallel edges), in that
/// enumeration order (`x < y < z < col0 < col1 < col2 < edge-cross`),
/// ties favoring whichever axis is tested first. Returns `None` the
/// moment any axis separates the boxes.
pub fn obb_obb_sat(
    center_delta: Vector3,
    half_a: Vector3,
    axes_a: [Vector3; 3],
    half_b: Vector3,
    axes_b: [Vector3; 3],
) -> Option<SatResult> {
    let mut candidate_axes: Vec<Vector3> = Vec::with_capacity(15);
    candidate_axes.extend_from_slice(&axes_a);
    candidate_axes.extend_from_slice(&axes_b);
    for a in &axes_a {
        for b in &axes_b {
            let cross = a.cross(b);
            if !is_degenerate_axis(cross) {
                candidate_axes.push(cross.normalize());
            }
        }
    }

    let mut best: Option<SatResult> = None;
    for axis in candidate_axes {
        let proj_a = half_a.x * axes_a[0].dot(&axis).abs()
            + half_a.y * axes_a[1].dot(&axis).abs()
            + half_a.z * axes_a[2].dot(&axis).abs();
        let proj_b = half_b.x * axes_b[0].dot(&axis).abs()
            + half_b.y * axes_b[1].dot(&axis).abs()
            + half_b.z * axes_b[2].dot(&axis).abs();
        let separation = center_delta.dot(&axis).abs();
        let penetration = (proj_a + proj_b) - separation;

        if penetration < 0.0 {
            return None;
        }

        if best.map_or(true, |b| penetration < b.penetration) {
            let mut normal = axis;
            if center_delta.dot(&normal) < 0.0 {
                normal = -normal;
            }
            best = Some(SatResult {
                normal,
                penetration,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    fn world_axes() -> [Vector3; 3] {
        [Vector3::x(), Vector3::y(), Vector3::z()]
    }

    #[test]
    fn disjoint_aabbs_report_no_collision() {
        let center_a = Point3::new(0.0, 0.0, 0.0);
        let center_b = Point3::new(10.0, 0.0, 0.0);
        let result = obb_obb_sat(
            center_b - center_a,
            Vector3::new(1.0, 1.0, 1.0),
            world_axes(),
            Vector3::new(1.0, 1.0, 1.0),
            world_axes(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn overlapping_aabbs_report_min_axis() {
        let center_a = Point3::new(0.0, 0.0, 0.0);
        let center_b = Point3::new(1.5, 0.0, 0.0);
        let result = obb_obb_sat(
            center_b - center_a,
            Vector3::new(1.0, 1.0, 1.0),
            world_axes(),
            Vector3::new(1.0, 1.0, 1.0),
            world_axes(),
        )
        .expect("overlapping");
        assert!((result.penetration - 0.5).abs() < 1e-5);
        assert!(result.normal.x > 0.0);
    }
}

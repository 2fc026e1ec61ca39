//! Vector3 helpers that `nalgebra` does not provide out of the box.

use super::Vector3;

/// Returns a unit vector orthogonal to unit axis `a`.
///
/// Crosses `a` with `{1,0,0}` unless `a` is nearly parallel to that axis
/// (`|a.x| >= 0.9`), in which case it crosses with `{0,1,0}` instead, so the
/// cross product never degenerates.
pub fn make_perpendicular(a: Vector3) -> Vector3 {
    let helper = if a.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    a.cross(&helper).normalize()
}

/// `v[axis]`, for callers that pick an axis at runtime rather than
/// spelling out `.x`/`.y`/`.z`.
///
/// `axis` must be `0`, `1`, or `2`; anything else is a programmer error,
/// not a value this crate's geometry ever produces.
pub(crate) fn axis_component(v: Vector3, axis: usize) -> f32 {
    debug_assert!(axis < 3, "axis index out of range: {axis}");
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perpendicular_to_x_axis_uses_y_helper() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let p = make_perpendicular(a);
        assert_relative_eq!(p.dot(&a), 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn perpendicular_to_arbitrary_axis_is_unit_and_orthogonal() {
        let a = Vector3::new(0.3, 0.4, 0.866_025_4).normalize();
        let p = make_perpendicular(a);
        assert_relative_eq!(p.dot(&a), 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn perpendicular_to_near_x_axis_switches_helper() {
        let a = Vector3::new(0.95, 0.1, 0.0).normalize();
        let p = make_perpendicular(a);
        assert_relative_eq!(p.dot(&a), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn axis_component_selects_x_y_z() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(axis_component(v, 0), 1.0);
        assert_eq!(axis_component(v, 1), 2.0);
        assert_eq!(axis_component(v, 2), 3.0);
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn axis_component_out_of_range_panics_in_debug() {
        axis_component(Vector3::new(1.0, 2.0, 3.0), 3);
    }
}

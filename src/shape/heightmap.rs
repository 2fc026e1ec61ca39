//! Heightmap (heightfield terrain) shape.

use crate::geom::{Aabb, Ray3, RayHit};
use crate::math::{Point3, Vector3, EPS_PARALLEL};

/// Number of fixed-fraction steps per grid cell used while marching a ray
/// across the terrain looking for the first "above -> below" crossing.
const MARCH_STEPS_PER_CELL: f32 = 2.0;

/// Number of bisection iterations used to refine the crossing once
/// bracketed.
const REFINE_ITERATIONS: u32 = 10;

/// A heightfield terrain patch: an origin, a `width x depth` grid of
/// heights sampled on a uniform `cell_size` spacing, with cached
/// (min, max) height.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    /// World-space position of grid cell (0, 0).
    pub origin: Point3,
    width: usize,
    depth: usize,
    cell_size: f32,
    heights: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl Heightmap {
    /// Builds a heightmap from a row-major `width * depth` height grid.
    pub fn new(origin: Point3, width: usize, depth: usize, cell_size: f32, heights: Vec<f32>) -> Self {
        assert_eq!(heights.len(), width * depth, "height grid size mismatch");
        let (min_height, max_height) = heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            });
        Self {
            origin,
            width,
            depth,
            cell_size,
            heights,
            min_height,
            max_height,
        }
    }

    /// Translates the heightmap's origin. The height grid itself is
    /// immutable after construction.
    pub fn translate(&mut self, delta: Vector3) {
        self.origin += delta;
    }

    /// World-space bounding box spanning the full grid footprint and the
    /// cached (min, max) height.
    pub fn aabb(&self) -> Aabb {
        let width_extent = (self.width.saturating_sub(1)) as f32 * self.cell_size;
        let depth_extent = (self.depth.saturating_sub(1)) as f32 * self.cell_size;
        Aabb::new(
            self.origin + Vector3::new(0.0, self.min_height, 0.0),
            self.origin + Vector3::new(width_extent, self.max_height, depth_extent),
        )
    }

    fn grid_height(&self, i: usize, j: usize) -> f32 {
        let i = i.min(self.width.saturating_sub(1));
        let j = j.min(self.depth.saturating_sub(1));
        self.heights[j * self.width + i]
    }

    /// Bilinear-interpolated terrain height at world-space `(x, z)`.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        if self.width < 2 || self.depth < 2 {
            return self.heights.first().copied().unwrap_or(0.0);
        }
        let local_x = ((x - self.origin.x) / self.cell_size).clamp(0.0, (self.width - 1) as f32);
        let local_z = ((z - self.origin.z) / self.cell_size).clamp(0.0, (self.depth - 1) as f32);

        let i0 = local_x.floor() as usize;
        let j0 = local_z.floor() as usize;
        let fx = local_x - i0 as f32;
        let fz = local_z - j0 as f32;

        let h00 = self.grid_height(i0, j0);
        let h10 = self.grid_height(i0 + 1, j0);
        let h01 = self.grid_height(i0, j0 + 1);
        let h11 = self.grid_height(i0 + 1, j0 + 1);

        let top = h00 * (1.0 - fx) + h10 * fx;
        let bottom = h01 * (1.0 - fx) + h11 * fx;
        top * (1.0 - fz) + bottom * fz
    }

    /// Bilinear surface normal at world-space `(x, z)`, derived from the
    /// height gradient across the cell.
    pub fn normal_at(&self, x: f32, z: f32) -> Vector3 {
        let eps = self.cell_size.max(EPS_PARALLEL) * 0.5;
        let dhdx = (self.height_at(x + eps, z) - self.height_at(x - eps, z)) / (2.0 * eps);
        let dhdz = (self.height_at(x, z + eps) - self.height_at(x, z - eps)) / (2.0 * eps);
        Vector3::new(-dhdx, 1.0, -dhdz).normalize()
    }

    fn ray_aabb_interval(&self, ray: &Ray3) -> Option<(f32, f32)> {
        let aabb = self.aabb();
        let mut t_min = 0.0_f32;
        let mut t_max = ray.max_distance;
        let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
        let dir = [ray.direction.x, ray.direction.y, ray.direction.z];
        let min = [aabb.min.x, aabb.min.y, aabb.min.z];
        let max = [aabb.max.x, aabb.max.y, aabb.max.z];
        for axis in 0..3 {
            if dir[axis].abs() < EPS_PARALLEL {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv_d = 1.0 / dir[axis];
            let mut t1 = (min[axis] - origin[axis]) * inv_d;
            let mut t2 = (max[axis] - origin[axis]) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
        Some((t_min, t_max))
    }

    /// Clips `ray` to the terrain's bounding box, marches forward in
    /// fixed-fraction cell steps looking for the point where the ray
    /// drops below the terrain surface, then bisects ten times to refine
    /// the crossing.
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        let Some((t0, t1)) = self.ray_aabb_interval(ray) else {
            return RayHit::Miss;
        };
        if t0 > t1 {
            return RayHit::Miss;
        }

        let is_below = |t: f32| -> bool {
            let p = ray.point_at(t);
            p.y <= self.height_at(p.x, p.z)
        };

        if is_below(t0) {
            let p = ray.point_at(t0);
            return RayHit::Hit {
                t: t0,
                point: p,
                normal: self.normal_at(p.x, p.z),
            };
        }

        let step = (self.cell_size / MARCH_STEPS_PER_CELL).max(EPS_PARALLEL);
        let mut prev_t = t0;
        let mut t = t0;
        while t < t1 {
            t = (t + step).min(t1);
            if is_below(t) {
                let mut lo = prev_t;
                let mut hi = t;
                for _ in 0..REFINE_ITERATIONS {
                    let mid = (lo + hi) * 0.5;
                    if is_below(mid) {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                let p = ray.point_at(hi);
                return RayHit::Hit {
                    t: hi,
                    point: p,
                    normal: self.normal_at(p.x, p.z),
                };
            }
            prev_t = t;
        }

        RayHit::Miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_plane(height: f32) -> Heightmap {
        Heightmap::new(Point3::origin(), 4, 4, 1.0, vec![height; 16])
    }

    #[test]
    fn height_at_flat_plane_is_constant() {
        let hm = flat_plane(2.0);
        assert!((hm.height_at(1.5, 1.5) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn ray_straight_down_hits_flat_plane() {
        let hm = flat_plane(1.0);
        let ray = Ray3::new(Point3::new(1.5, 10.0, 1.5), Vector3::new(0.0, -1.0, 0.0), 100.0);
        let hit = hm.ray_intersect(&ray);
        assert!(hit.is_hit());
        if let RayHit::Hit { t, .. } = hit {
            assert!((t - 9.0).abs() < 0.05);
        }
    }

    #[test]
    fn ray_parallel_to_plane_above_it_misses() {
        let hm = flat_plane(1.0);
        let ray = Ray3::new(Point3::new(-5.0, 5.0, 1.5), Vector3::new(1.0, 0.0, 0.0), 100.0);
        assert_eq!(hm.ray_intersect(&ray), RayHit::Miss);
    }
}

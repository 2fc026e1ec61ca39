//! Convex hull shape: pre-triangulated vertices and outward-facing faces.
//!
//! This type assumes callers supply a complete, pre-triangulated hull
//! (vertices + faces with outward unit normals) rather than attempting
//! hull construction itself; `contains_point` and `ray_intersect` replace
//! a naive point-in-face stub with a real plane/barycentric test.

use crate::geom::{self, Aabb, Ray3, RayHit};
use crate::math::{Point3, Vector3, EPS_PARALLEL};

/// One triangular face of a hull: three vertex indices plus a unit
/// outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullFace {
    /// Indices into the hull's vertex table.
    pub indices: [usize; 3],
    /// Unit outward-facing normal.
    pub normal: Vector3,
}

/// A convex hull given as world-space vertices plus triangulated,
/// outward-normal-carrying faces.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Point3>,
    faces: Vec<HullFace>,
    /// Arithmetic mean of `vertices`; this is the hull's `position()`.
    pub centroid: Point3,
    cached_aabb: Aabb,
}

impl ConvexHull {
    /// Builds a hull from vertices and pre-triangulated faces.
    ///
    /// Zero vertices (and therefore zero faces) is allowed; all
    /// subsequent queries report "no collision"/"miss".
    pub fn new(vertices: Vec<Point3>, faces: Vec<HullFace>) -> Self {
        let centroid = if vertices.is_empty() {
            Point3::origin()
        } else {
            let sum = vertices
                .iter()
                .fold(Vector3::zeros(), |acc, v| acc + v.coords);
            Point3::from(sum / vertices.len() as f32)
        };
        let cached_aabb = Aabb::from_points(&vertices)
            .unwrap_or_else(|| Aabb::new(Point3::origin(), Point3::origin()));
        if vertices.is_empty() {
            tracing::debug!("constructed convex hull with zero vertices (degenerate)");
        } else {
            tracing::debug!(vertex_count = vertices.len(), face_count = faces.len(), "constructed convex hull");
        }
        Self {
            vertices,
            faces,
            centroid,
            cached_aabb,
        }
    }

    /// The hull's vertex table.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// The hull's triangulated faces.
    pub fn faces(&self) -> &[HullFace] {
        &self.faces
    }

    /// Translates every vertex and the centroid by `delta`.
    pub fn translate(&mut self, delta: Vector3) {
        for v in &mut self.vertices {
            *v += delta;
        }
        self.centroid += delta;
        self.cached_aabb = self.cached_aabb.translate(delta);
    }

    /// World-space bounding box over all vertices.
    pub fn aabb(&self) -> Aabb {
        self.cached_aabb
    }

    /// Vertex with maximal projection onto `d`.
    pub fn support(&self, d: Vector3) -> Point3 {
        self.vertices
            .iter()
            .copied()
            .fold(None, |best: Option<Point3>, v| match best {
                None => Some(v),
                Some(b) if v.coords.dot(&d) > b.coords.dot(&d) => Some(v),
                Some(b) => Some(b),
            })
            .unwrap_or(self.centroid)
    }

    /// `true` if `p` lies on the interior side of every face plane.
    ///
    /// Used by sphere-vs-hull to distinguish interior contacts (push out
    /// along the nearest face) from exterior ones.
    pub fn contains_point(&self, p: Point3) -> bool {
        self.faces.iter().all(|face| {
            let a = self.vertices[face.indices[0]];
            (p - a).dot(&face.normal) <= EPS_PARALLEL
        })
    }

    /// The face whose plane is nearest to an interior point `p`, along
    /// with the (non-negative) distance to that plane.
    pub fn nearest_face(&self, p: Point3) -> Option<(&HullFace, f32)> {
        self.faces
            .iter()
            .map(|face| {
                let a = self.vertices[face.indices[0]];
                let signed = (p - a).dot(&face.normal);
                (face, -signed)
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).expect("distances are finite"))
    }

    /// Ray vs. each face's triangle; retains the smallest positive `t`
    /// among faces actually struck (the barycentric test inside
    /// `ray_vs_triangle` replaces the stubbed-out point-in-face check).
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        let mut best = RayHit::Miss;
        for face in &self.faces {
            let a = self.vertices[face.indices[0]];
            let b = self.vertices[face.indices[1]];
            let c = self.vertices[face.indices[2]];
            let hit = geom::ray_vs_triangle(ray, a, b, c);
            if let RayHit::Hit { t, .. } = hit {
                if let RayHit::Hit { t: best_t, .. } = best {
                    if t < best_t {
                        best = hit;
                    }
                } else {
                    best = hit;
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tetrahedron() -> ConvexHull {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = vec![
            HullFace {
                indices: [0, 2, 1],
                normal: Vector3::new(0.0, 0.0, -1.0),
            },
            HullFace {
                indices: [0, 1, 3],
                normal: Vector3::new(0.0, -1.0, 0.0),
            },
            HullFace {
                indices: [0, 3, 2],
                normal: Vector3::new(-1.0, 0.0, 0.0),
            },
            HullFace {
                indices: [1, 2, 3],
                normal: Vector3::new(1.0, 1.0, 1.0).normalize(),
            },
        ];
        ConvexHull::new(vertices, faces)
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let hull = unit_tetrahedron();
        assert!((hull.centroid.x - 0.25).abs() < 1e-5);
    }

    #[test]
    fn support_picks_extreme_vertex() {
        let hull = unit_tetrahedron();
        let p = hull.support(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(p, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn empty_hull_misses_rays() {
        let hull = ConvexHull::new(Vec::new(), Vec::new());
        let ray = Ray3::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0), 10.0);
        assert_eq!(hull.ray_intersect(&ray), RayHit::Miss);
    }
}

//! Immutable triangle-soup shape, backed by an owned BVH.

use crate::geom::{Aabb, Ray3, RayHit};
use crate::math::{Point3, Vector3};
use crate::mesh::Bvh;

/// An immutable triangle soup (vertex table + index triples) plus its
/// owned [`Bvh`].
///
/// Zero vertices/triangles is allowed and simply returns "no
/// collision"/"miss" for every subsequent query.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Point3>,
    triangles: Vec<[usize; 3]>,
    bvh: Bvh,
    cached_aabb: Aabb,
}

impl TriangleMesh {
    /// Builds a mesh from a vertex table and triangle index triples.
    ///
    /// BVH construction uses `rayon` to fork large subtrees across
    /// threads when the `parallel` feature is enabled (the default),
    /// falling back to the sequential builder otherwise.
    pub fn new(vertices: Vec<Point3>, triangles: Vec<[usize; 3]>) -> Self {
        #[cfg(feature = "parallel")]
        let bvh = Bvh::build_default_parallel(&vertices, &triangles);
        #[cfg(not(feature = "parallel"))]
        let bvh = Bvh::build_default(&vertices, &triangles);
        let cached_aabb = Aabb::from_points(&vertices)
            .unwrap_or_else(|| Aabb::new(Point3::origin(), Point3::origin()));
        Self {
            vertices,
            triangles,
            bvh,
            cached_aabb,
        }
    }

    /// The mesh's vertex table.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// The mesh's triangle index triples.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Translates every vertex by `delta`; the BVH's cached node bounds
    /// are shifted by the same delta rather than rebuilt, since relative
    /// triangle geometry is unchanged.
    pub fn translate(&mut self, delta: Vector3) {
        for v in &mut self.vertices {
            *v += delta;
        }
        self.bvh.translate(delta);
        self.cached_aabb = self.cached_aabb.translate(delta);
    }

    /// World-space bounding box over all vertices.
    pub fn aabb(&self) -> Aabb {
        self.cached_aabb
    }

    /// Triangle indices whose own AABB overlaps `query`.
    pub fn triangles_in_aabb(&self, query: &Aabb) -> Vec<usize> {
        self.bvh
            .triangles_in_aabb(&self.vertices, &self.triangles, query)
    }

    /// Triangle indices within `radius` of `center`.
    pub fn triangles_intersecting_sphere(&self, center: Point3, radius: f32) -> Vec<usize> {
        self.bvh
            .triangles_intersecting_sphere(&self.vertices, &self.triangles, center, radius)
    }

    /// Vertex positions of triangle `index`.
    pub fn triangle_vertices(&self, index: usize) -> [Point3; 3] {
        let tri = self.triangles[index];
        [
            self.vertices[tri[0]],
            self.vertices[tri[1]],
            self.vertices[tri[2]],
        ]
    }

    /// Delegates to the BVH for the closest ray-vs-triangle hit.
    pub fn ray_intersect(&self, ray: &Ray3) -> RayHit {
        self.bvh.intersect_ray(&self.vertices, &self.triangles, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> TriangleMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        TriangleMesh::new(vertices, vec![[0, 1, 2], [0, 2, 3]])
    }

    #[test]
    fn empty_mesh_misses_every_ray() {
        let mesh = TriangleMesh::new(Vec::new(), Vec::new());
        let ray = Ray3::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0), 10.0);
        assert_eq!(mesh.ray_intersect(&ray), RayHit::Miss);
    }

    #[test]
    fn translate_shifts_vertices_and_bounds() {
        let mut mesh = quad();
        mesh.translate(Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(mesh.vertices()[0].z, 5.0);
        assert_eq!(mesh.aabb().min.z, 5.0);
    }

    #[test]
    fn ray_hits_quad() {
        let mesh = quad();
        let ray = Ray3::new(Point3::new(0.5, 0.5, 5.0), Vector3::new(0.0, 0.0, -1.0), 100.0);
        assert!(mesh.ray_intersect(&ray).is_hit());
    }
}

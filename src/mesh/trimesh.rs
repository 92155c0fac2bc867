//! Indexed triangle mesh.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::error::{Result, UnwrapError};

/// An indexed triangle mesh.
///
/// Invariants established by [`TriMesh::new`]:
/// - there is at least one triangle,
/// - every triangle index is in range,
/// - no triangle repeats a vertex index.
///
/// Geometric degeneracy (zero area with distinct indices) is not rejected
/// here; the conformal solver reports it when it matters.
#[derive(Debug, Clone, PartialEq)]
pub struct TriMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
}

impl TriMesh {
    /// Build a mesh from vertex positions and triangles.
    ///
    /// # Errors
    ///
    /// - [`UnwrapError::EmptyMesh`] if there are no triangles
    /// - [`UnwrapError::InvalidVertexIndex`] if a triangle index is out of range
    /// - [`UnwrapError::DegenerateTriangle`] if a triangle repeats a vertex
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(UnwrapError::EmptyMesh);
        }

        for (ti, tri) in triangles.iter().enumerate() {
            for &vi in tri {
                if vi >= vertices.len() {
                    return Err(UnwrapError::InvalidVertexIndex {
                        triangle: ti,
                        vertex: vi,
                    });
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(UnwrapError::DegenerateTriangle { triangle: ti });
            }
        }

        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Triangles as vertex index triples.
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Split into vertices and triangles.
    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        (self.vertices, self.triangles)
    }

    /// Corner positions of a triangle.
    #[inline]
    pub fn triangle_points(&self, t: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[t];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Area of a triangle.
    pub fn triangle_area(&self, t: usize) -> f64 {
        let [p0, p1, p2] = self.triangle_points(t);
        (p1 - p0).cross(&(p2 - p0)).norm() * 0.5
    }

    /// Centroid of a triangle.
    pub fn triangle_centroid(&self, t: usize) -> Point3<f64> {
        let [p0, p1, p2] = self.triangle_points(t);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        (0..self.triangles.len())
            .map(|t| self.triangle_area(t))
            .sum()
    }

    /// First triangle (in storage order) that uses vertex `v`.
    pub fn first_triangle_with(&self, v: usize) -> Option<usize> {
        self.triangles.iter().position(|tri| tri.contains(&v))
    }

    /// Axis-aligned bounding box, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.vertices {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some((min, max))
    }

    /// Number of triangles incident to each undirected edge.
    ///
    /// Keys are `(min, max)` vertex pairs.
    pub fn edge_triangle_counts(&self) -> HashMap<(usize, usize), usize> {
        let mut counts = HashMap::new();
        for tri in &self.triangles {
            for i in 0..3 {
                let a = tri[i];
                let b = tri[(i + 1) % 3];
                let key = if a < b { (a, b) } else { (b, a) };
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Edges used by exactly one triangle, sorted.
    pub fn boundary_edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<_> = self
            .edge_triangle_counts()
            .into_iter()
            .filter_map(|(edge, count)| (count == 1).then_some(edge))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Unit normal of a triangle, or zero for a degenerate one.
    pub fn triangle_normal(&self, t: usize) -> Vector3<f64> {
        let [p0, p1, p2] = self.triangle_points(t);
        let n = (p1 - p0).cross(&(p2 - p0));
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            Vector3::zeros()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> TriMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        TriMesh::new(vertices, vec![[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_new_validates_indices() {
        let vertices = vec![Point3::origin(); 3];
        match TriMesh::new(vertices.clone(), vec![[0, 1, 3]]) {
            Err(UnwrapError::InvalidVertexIndex { triangle, vertex }) => {
                assert_eq!(triangle, 0);
                assert_eq!(vertex, 3);
            }
            other => panic!("expected InvalidVertexIndex, got {:?}", other),
        }

        assert!(matches!(
            TriMesh::new(vertices.clone(), vec![[0, 1, 1]]),
            Err(UnwrapError::DegenerateTriangle { triangle: 0 })
        ));
        assert!(matches!(
            TriMesh::new(vertices, vec![]),
            Err(UnwrapError::EmptyMesh)
        ));
    }

    #[test]
    fn test_areas() {
        let mesh = unit_square();
        assert!((mesh.triangle_area(0) - 0.5).abs() < 1e-12);
        assert!((mesh.surface_area() - 1.0).abs() < 1e-12);

        let n = mesh.triangle_normal(0);
        assert!((n.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_edges() {
        let mesh = unit_square();
        let boundary = mesh.boundary_edges();
        assert_eq!(boundary, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
        assert_eq!(mesh.edge_triangle_counts()[&(0, 2)], 2);
    }

    #[test]
    fn test_first_triangle_with() {
        let mesh = unit_square();
        assert_eq!(mesh.first_triangle_with(0), Some(0));
        assert_eq!(mesh.first_triangle_with(3), Some(1));
        assert_eq!(mesh.first_triangle_with(9), None);

        let c = mesh.triangle_centroid(1);
        assert!((c.x - 1.0 / 3.0).abs() < 1e-12);
        assert!((c.y - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let mesh = unit_square();
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
    }
}

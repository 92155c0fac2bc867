//! UV coordinate storage.
//!
//! This module provides the [`UVMap`] type for storing 2D parameterization
//! coordinates for mesh vertices.

use nalgebra::{Matrix3, Point2};

/// UV coordinates for mesh vertices, index-aligned with the mesh vertices.
///
/// # Example
///
/// ```
/// use unfurl::algo::parameterize::UVMap;
/// use nalgebra::Point2;
///
/// let uv = UVMap::new(vec![Point2::new(0.0, 0.0), Point2::new(2.0, 1.0)]);
/// assert_eq!(uv.get(1), Point2::new(2.0, 1.0));
/// assert_eq!(uv.bounding_box(), Some((Point2::new(0.0, 0.0), Point2::new(2.0, 1.0))));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UVMap {
    coords: Vec<Point2<f64>>,
}

impl UVMap {
    /// Create a new UV map with the given coordinates.
    pub fn new(coords: Vec<Point2<f64>>) -> Self {
        Self { coords }
    }

    /// Create a UV map filled with zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            coords: vec![Point2::origin(); n],
        }
    }

    /// Get the UV coordinates of vertex `v`.
    #[inline]
    pub fn get(&self, v: usize) -> Point2<f64> {
        self.coords[v]
    }

    /// Set the UV coordinates of vertex `v`.
    #[inline]
    pub fn set(&mut self, v: usize, uv: Point2<f64>) {
        self.coords[v] = uv;
    }

    /// Get the number of UV coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterate over `(vertex, uv)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Point2<f64>)> + '_ {
        self.coords.iter().copied().enumerate()
    }

    /// Get the raw coordinates slice.
    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.coords
    }

    /// Consume the map, returning the coordinates.
    pub fn into_vec(self) -> Vec<Point2<f64>> {
        self.coords
    }

    /// Compute the bounding box of the UV coordinates.
    ///
    /// Returns `None` if the UV map is empty.
    pub fn bounding_box(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        let first = self.coords.first()?;
        let mut min = *first;
        let mut max = *first;
        for uv in &self.coords {
            min = min.inf(uv);
            max = max.sup(uv);
        }
        Some((min, max))
    }

    /// Apply a homogeneous 2D transform to every coordinate.
    pub fn transformed(&self, transform: &Matrix3<f64>) -> Self {
        Self {
            coords: self
                .coords
                .iter()
                .map(|p| transform.transform_point(p))
                .collect(),
        }
    }

    /// Total unsigned triangle area in UV space.
    pub fn total_area(&self, triangles: &[[usize; 3]]) -> f64 {
        triangles
            .iter()
            .map(|&[a, b, c]| {
                let p0 = self.coords[a];
                let e1 = self.coords[b] - p0;
                let e2 = self.coords[c] - p0;
                0.5 * (e1.x * e2.y - e2.x * e1.y).abs()
            })
            .sum()
    }
}

impl From<Vec<Point2<f64>>> for UVMap {
    fn from(coords: Vec<Point2<f64>>) -> Self {
        Self::new(coords)
    }
}

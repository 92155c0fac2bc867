//! Splitting vertices on a face's self-seam.
//!
//! A face that closes on itself (cylinder, cone, sphere) is tessellated with
//! one set of 3D vertices, but the parameter domain is cut open: a vertex on
//! the closing edge has two valid UV nodes, one on each side of the cut. The
//! vertex is split per triangle, picking the UV node on the triangle's side.

use nalgebra::{Point2, Point3};
use rayon::prelude::*;

use crate::geometry::ParametricSurface;
use crate::mesh::IndexCache;

/// Options for seam disambiguation.
#[derive(Debug, Clone)]
pub struct DisambiguateOptions {
    /// Weight of the vertex itself in the biased sample point. The two other
    /// triangle corners share the remainder equally.
    pub weighting: f64,
    /// Distance within which several UV nodes count as equally near.
    pub tie_tolerance: f64,
}

impl Default for DisambiguateOptions {
    fn default() -> Self {
        Self {
            weighting: 0.9,
            tie_tolerance: 1e-9,
        }
    }
}

impl DisambiguateOptions {
    /// Set the sample weighting.
    pub fn with_weighting(mut self, weighting: f64) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the nearest-match tie tolerance.
    pub fn with_tie_tolerance(mut self, tie_tolerance: f64) -> Self {
        self.tie_tolerance = tie_tolerance;
        self
    }
}

/// A face mesh with self-seam vertices split.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlinkedMesh {
    /// Vertex positions; split vertices appear once per side.
    pub vertices: Vec<Point3<f64>>,
    /// UV node of each vertex, `None` for a vertex that no node matched.
    pub uv_nodes: Vec<Option<Point2<f64>>>,
    /// Re-indexed triangles.
    pub triangles: Vec<[usize; 3]>,
}

/// Match UV nodes to mesh vertices.
///
/// Each UV node is evaluated on the surface and assigned to its nearest
/// vertex, or to all vertices within `tie_tolerance` of the nearest
/// distance. Returns, for every vertex, the ascending list of node indices
/// assigned to it.
pub fn match_nodes<S: ParametricSurface + ?Sized>(
    surface: &S,
    vertices: &[Point3<f64>],
    uv_nodes: &[Point2<f64>],
    tie_tolerance: f64,
) -> Vec<Vec<usize>> {
    let nearest: Vec<Vec<usize>> = uv_nodes
        .par_iter()
        .map(|node| {
            let sample = surface.value_at(node.x, node.y);
            let distances: Vec<f64> = vertices.iter().map(|v| (v - sample).norm()).collect();
            let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
            distances
                .iter()
                .enumerate()
                .filter_map(|(i, &d)| (d <= min + tie_tolerance).then_some(i))
                .collect()
        })
        .collect();

    let mut matches = vec![Vec::new(); vertices.len()];
    for (node, vertex_list) in nearest.into_iter().enumerate() {
        for v in vertex_list {
            matches[v].push(node);
        }
    }
    matches
}

/// Split vertices that carry more than one UV node.
///
/// For every triangle corner whose vertex matched several UV nodes, a sample
/// point is taken inside the triangle close to the corner and projected onto
/// the surface; the node nearest in parameter space wins. Output vertices
/// are keyed by `(vertex, chosen node)` in order of first use.
///
/// # Example
///
/// ```
/// use unfurl::algo::seam::{unlink_edge_nodes, DisambiguateOptions};
/// use unfurl::geometry::PlaneSurface;
/// use nalgebra::{Point2, Point3, Vector3};
///
/// let plane = PlaneSurface {
///     origin: Point3::origin(),
///     u_axis: Vector3::x(),
///     v_axis: Vector3::y(),
/// };
/// let vertices = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
/// let nodes = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
///
/// let out = unlink_edge_nodes(&plane, &vertices, &nodes, &[[0, 1, 2]], &DisambiguateOptions::default());
/// assert_eq!(out.vertices, vertices);
/// assert_eq!(out.uv_nodes[2], Some(Point2::new(0.0, 1.0)));
/// ```
pub fn unlink_edge_nodes<S: ParametricSurface + ?Sized>(
    surface: &S,
    vertices: &[Point3<f64>],
    uv_nodes: &[Point2<f64>],
    triangles: &[[usize; 3]],
    options: &DisambiguateOptions,
) -> UnlinkedMesh {
    let matches = match_nodes(surface, vertices, uv_nodes, options.tie_tolerance);
    let weighting = options.weighting;
    let side_weight = 0.5 * (1.0 - weighting);

    let mut cache: IndexCache<(usize, Option<usize>)> = IndexCache::new();
    let mut split = 0usize;

    let unlinked: Vec<[usize; 3]> = triangles
        .iter()
        .map(|tri| {
            let mut out = [0usize; 3];
            for (corner, &v) in tri.iter().enumerate() {
                let candidates = &matches[v];
                let key = match candidates.as_slice() {
                    [] => (v, None),
                    [only] => (v, Some(*only)),
                    _ => {
                        let a = vertices[tri[(corner + 1) % 3]];
                        let b = vertices[tri[(corner + 2) % 3]];
                        let sample = Point3::from(
                            vertices[v].coords * weighting + (a.coords + b.coords) * side_weight,
                        );
                        let reference = surface.parameter(&sample);
                        let nearest = candidates
                            .iter()
                            .copied()
                            .min_by(|&i, &j| {
                                let di = (uv_nodes[i] - reference).norm_squared();
                                let dj = (uv_nodes[j] - reference).norm_squared();
                                di.total_cmp(&dj)
                            });
                        split += 1;
                        (v, nearest)
                    }
                };
                out[corner] = cache.index_of(key);
            }
            out
        })
        .collect();

    let keys = cache.into_keys();
    let out_vertices = keys.iter().map(|&(v, _)| vertices[v]).collect();
    let out_nodes = keys
        .iter()
        .map(|&(_, node)| node.map(|n| uv_nodes[n]))
        .collect();

    log::debug!(
        "disambiguate: {} ambiguous corners, {} -> {} vertices",
        split,
        vertices.len(),
        keys.len()
    );

    UnlinkedMesh {
        vertices: out_vertices,
        uv_nodes: out_nodes,
        triangles: unlinked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CylinderSurface;
    use std::f64::consts::{FRAC_PI_2, TAU};

    /// Unit cylinder tessellated as 4 columns by 1 row.
    ///
    /// Vertex `c + 4 r` sits at angle `c π/2`, height `r`. The UV nodes span
    /// `u ∈ [0, 2π]` so the closing column has nodes at both 0 and 2π.
    fn ring() -> (Vec<Point3<f64>>, Vec<Point2<f64>>, Vec<[usize; 3]>) {
        let cyl = CylinderSurface { radius: 1.0 };
        let mut vertices = Vec::new();
        for r in 0..2 {
            for c in 0..4 {
                vertices.push(cyl.value_at(c as f64 * FRAC_PI_2, r as f64));
            }
        }
        let mut nodes = Vec::new();
        for r in 0..2 {
            for k in 0..=4 {
                nodes.push(Point2::new(k as f64 * FRAC_PI_2, r as f64));
            }
        }
        let mut triangles = Vec::new();
        for c in 0..4 {
            let c2 = (c + 1) % 4;
            triangles.push([c, c2, c2 + 4]);
            triangles.push([c, c2 + 4, c + 4]);
        }
        (vertices, nodes, triangles)
    }

    #[test]
    fn test_match_nodes_ties() {
        let (vertices, nodes, _) = ring();
        let cyl = CylinderSurface { radius: 1.0 };
        let matches = match_nodes(&cyl, &vertices, &nodes, 1e-9);

        assert_eq!(matches[0], vec![0, 4]);
        assert_eq!(matches[4], vec![5, 9]);
        assert_eq!(matches[1], vec![1]);
        assert_eq!(matches[7], vec![8]);
    }

    #[test]
    fn test_cylinder_seam_split() {
        let (vertices, nodes, triangles) = ring();
        let cyl = CylinderSurface { radius: 1.0 };
        let out = unlink_edge_nodes(&cyl, &vertices, &nodes, &triangles, &DisambiguateOptions::default());

        assert_eq!(out.vertices.len(), 10);
        assert_eq!(out.uv_nodes.len(), 10);
        assert_eq!(out.triangles.len(), triangles.len());

        // The first column uses u = 0, the closing column u = 2π.
        let first = out.triangles[0];
        let closing = out.triangles[6];
        assert_eq!(out.uv_nodes[first[0]].map(|p| p.x), Some(0.0));
        let closing_u = out.uv_nodes[closing[1]].map(|p| p.x).unwrap();
        assert!((closing_u - TAU).abs() < 1e-12);
        assert_ne!(first[0], closing[1]);
        assert_eq!(out.vertices[first[0]], out.vertices[closing[1]]);
    }

    #[test]
    fn test_every_triangle_is_parametrically_compact() {
        let (vertices, nodes, triangles) = ring();
        let cyl = CylinderSurface { radius: 1.0 };
        let out = unlink_edge_nodes(&cyl, &vertices, &nodes, &triangles, &DisambiguateOptions::default());

        for tri in &out.triangles {
            let us: Vec<f64> = tri.iter().map(|&i| out.uv_nodes[i].unwrap().x).collect();
            let span = us.iter().cloned().fold(f64::MIN, f64::max)
                - us.iter().cloned().fold(f64::MAX, f64::min);
            assert!(span <= FRAC_PI_2 + 1e-9, "triangle {:?} spans {}", tri, span);
        }
    }

    #[test]
    fn test_unmatched_vertex_has_no_node() {
        let cyl = CylinderSurface { radius: 1.0 };
        let vertices = vec![
            cyl.value_at(0.0, 0.0),
            cyl.value_at(FRAC_PI_2, 0.0),
            cyl.value_at(0.0, 1.0),
        ];
        let nodes = vec![Point2::new(0.0, 0.0), Point2::new(FRAC_PI_2, 0.0)];
        let out = unlink_edge_nodes(&cyl, &vertices, &nodes, &[[0, 1, 2]], &DisambiguateOptions::default());

        assert_eq!(out.vertices, vertices);
        assert_eq!(out.uv_nodes[2], None);
    }
}

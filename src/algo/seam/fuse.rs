//! Fusing duplicated tessellation vertices along a topological edge.
//!
//! Tessellators emit every face separately, so an edge shared by two faces
//! appears twice in a combined mesh: once per face, with distinct but
//! coincident vertices. Fusing pairs up coincident mesh edges lying on the
//! topological edge and merges their end points.

use std::collections::{BTreeSet, HashMap, HashSet};

use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{warn, Warning};
use crate::geometry::EdgeShape;
use crate::mesh::IndexCache;

/// Options for seam fusion.
#[derive(Debug, Clone)]
pub struct FuseOptions {
    /// Distance below which two vertices are considered coincident, and
    /// within which a vertex is considered to lie on the edge.
    pub tolerance: f64,
}

impl Default for FuseOptions {
    fn default() -> Self {
        Self { tolerance: 1e-3 }
    }
}

impl FuseOptions {
    /// Set the coincidence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Disjoint sets over vertex indices.
///
/// `union(a, b)` always keeps the root of `a`, so the first mesh edge of a
/// fused pair provides the representative vertices.
#[derive(Debug, Default)]
struct FuseMap {
    parent: HashMap<usize, usize>,
}

impl FuseMap {
    fn find(&mut self, v: usize) -> usize {
        let mut root = v;
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }
        // Path compression
        let mut cur = v;
        while cur != root {
            let next = self.parent.get(&cur).copied().unwrap_or(root);
            self.parent.insert(cur, root);
            cur = next;
        }
        root
    }

    fn union(&mut self, target: usize, source: usize) {
        let target_root = self.find(target);
        let source_root = self.find(source);
        if target_root != source_root {
            self.parent.insert(source_root, target_root);
        }
    }
}

/// Fuse the tessellation along `edge`.
///
/// Returns a new vertex list containing only referenced, representative
/// vertices, and the re-indexed triangles. Vertex order follows first use
/// by the triangles.
///
/// Fusion is best effort: a mesh edge without a coincident partner is left
/// as is and reported as a [`Warning::UnfusedEdge`].
///
/// Mesh edges are processed in ascending `(v0, v1)` order, which makes the
/// result deterministic.
///
/// # Example
///
/// ```
/// use unfurl::algo::seam::{fuse_seam, FuseOptions};
/// use unfurl::geometry::LineSegment;
/// use nalgebra::Point3;
///
/// // Two unit squares emitted separately, touching at x = 1.
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0), Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0),
///     Point3::new(2.0, 1.0, 0.0), Point3::new(1.0, 1.0, 0.0),
/// ];
/// let triangles = vec![[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]];
/// let seam = LineSegment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
///
/// let (vertices, triangles) = fuse_seam(&vertices, &triangles, &seam, &FuseOptions::default());
/// assert_eq!(vertices.len(), 6);
/// assert_eq!(triangles[3], [1, 5, 2]);
/// ```
pub fn fuse_seam<E: EdgeShape + ?Sized>(
    vertices: &[Point3<f64>],
    triangles: &[[usize; 3]],
    edge: &E,
    options: &FuseOptions,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let tolerance = options.tolerance;

    let edge_vertices: BTreeSet<usize> = vertices
        .par_iter()
        .enumerate()
        .filter(|(_, p)| edge.is_inside(p, tolerance))
        .map(|(i, _)| i)
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    let on_edge: Vec<usize> = edge_vertices.iter().copied().collect();
    let candidates: HashMap<usize, HashSet<usize>> = on_edge
        .par_iter()
        .map(|&v| {
            let near = on_edge
                .iter()
                .copied()
                .filter(|&other| (vertices[v] - vertices[other]).norm() < tolerance)
                .collect();
            (v, near)
        })
        .collect();

    let mut mesh_edges = mesh_edges_on(&edge_vertices, triangles);
    log::debug!(
        "fuse: {} vertices and {} mesh edges on seam",
        edge_vertices.len(),
        mesh_edges.len()
    );

    let mut fuse_map = FuseMap::default();
    let mut paired: HashSet<(usize, usize)> = HashSet::new();

    while let Some(mesh_edge) = mesh_edges.pop_first() {
        let (a, b) = mesh_edge;
        let touches = |v: usize, e: &(usize, usize)| {
            candidates
                .get(&v)
                .is_some_and(|c| c.contains(&e.0) || c.contains(&e.1))
        };

        // Edges beyond the second coincident one are picked up when their
        // partner is popped in a later iteration.
        let partner = mesh_edges
            .iter()
            .find(|&&other| touches(a, &other) && touches(b, &other))
            .copied();

        let Some(partner) = partner else {
            if !paired.contains(&mesh_edge) {
                warn(&Warning::UnfusedEdge { v0: a, v1: b });
            }
            continue;
        };
        paired.insert(partner);

        let aligned = if candidates.get(&partner.0).is_some_and(|c| c.contains(&a)) {
            partner
        } else {
            (partner.1, partner.0)
        };

        fuse_map.union(a, aligned.0);
        fuse_map.union(b, aligned.1);
    }

    let mut cache = IndexCache::new();
    let fused_triangles: Vec<[usize; 3]> = triangles
        .iter()
        .map(|tri| tri.map(|v| cache.index_of(fuse_map.find(v))))
        .collect();
    let fused_vertices: Vec<Point3<f64>> = cache.keys().iter().map(|&v| vertices[v]).collect();

    log::debug!(
        "fuse: {} -> {} vertices",
        vertices.len(),
        fused_vertices.len()
    );

    (fused_vertices, fused_triangles)
}

/// Triangle edges with both end points on the topological edge.
///
/// Each edge is returned once as a `(min, max)` pair.
fn mesh_edges_on(edge_vertices: &BTreeSet<usize>, triangles: &[[usize; 3]]) -> BTreeSet<(usize, usize)> {
    let mut edges = BTreeSet::new();
    for tri in triangles {
        let mut sorted = *tri;
        sorted.sort_unstable();
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            if edge_vertices.contains(&sorted[i]) && edge_vertices.contains(&sorted[j]) {
                edges.insert((sorted[i], sorted[j]));
            }
        }
    }
    edges
}

//! Seam polylines in UV space.
//!
//! For every topological edge of an unwrapped feature, the mesh segments
//! lying on the edge are chained into an ordered polyline of UV points, so
//! the island outline and its internal edges can be drawn or exported.
//!
//! An edge whose first segment is shared by two triangles runs through the
//! inside of the island and is traced once. Any other edge is traced once
//! per adjacent included face, since each face carries its own copy of the
//! edge in UV space.

use std::collections::HashSet;

use nalgebra::{Point2, Point3};

use crate::algo::parameterize::UVMap;
use crate::error::{warn, Warning};
use crate::geometry::{count_included_faces, EdgeShape, FaceAdjacency};
use crate::mesh::TriMesh;

/// A topological edge to trace.
pub struct BoundaryEdge<'a> {
    pub id: String,
    pub shape: &'a dyn EdgeShape,
    /// Number of adjacent faces that are part of the unwrapped feature.
    pub included_faces: usize,
}

impl<'a> BoundaryEdge<'a> {
    pub fn new(id: impl Into<String>, shape: &'a dyn EdgeShape, included_faces: usize) -> Self {
        Self {
            id: id.into(),
            shape,
            included_faces,
        }
    }

    /// Count the included faces through an adjacency query.
    pub fn from_adjacency<A: FaceAdjacency>(
        id: impl Into<String>,
        shape: &'a dyn EdgeShape,
        adjacency: &A,
        edge: &A::Edge,
        included: &[A::Face],
    ) -> Self {
        Self::new(id, shape, count_included_faces(adjacency, edge, included))
    }
}

/// Options for boundary tracing.
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Distance within which a vertex lies on an edge or end point.
    pub tolerance: f64,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self { tolerance: 1e-3 }
    }
}

/// One traced copy of an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedBoundary {
    /// Id of the traced edge.
    pub edge: String,
    /// Mesh vertices along the polyline.
    pub vertices: Vec<usize>,
    /// UV coordinates along the polyline.
    pub points: Vec<Point2<f64>>,
    /// True for an edge inside the island, false for an outline edge.
    pub interior: bool,
}

/// Trace every edge of `edges` on the unwrapped `mesh`.
///
/// Edges listed twice are traced once. An edge with no mesh segment on it is
/// reported as [`Warning::EdgeWithoutSegments`] and skipped. A `uv` map
/// that does not match the vertex count gives [`Warning::UvMismatch`] and no
/// polylines.
pub fn trace_boundaries(
    mesh: &TriMesh,
    uv: &UVMap,
    edges: &[BoundaryEdge<'_>],
    options: &TraceOptions,
) -> Vec<TracedBoundary> {
    if uv.len() != mesh.num_vertices() {
        warn(&Warning::UvMismatch {
            expected: mesh.num_vertices(),
            actual: uv.len(),
        });
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut traced = Vec::new();

    for edge in edges {
        if !seen.insert(edge.id.as_str()) {
            continue;
        }
        let boundaries = trace_edge(mesh, uv, edge, options.tolerance);
        if boundaries.is_empty() {
            warn(&Warning::EdgeWithoutSegments(edge.id.clone()));
        }
        traced.extend(boundaries);
    }

    log::debug!("traced {} polylines for {} edges", traced.len(), seen.len());
    traced
}

fn trace_edge(mesh: &TriMesh, uv: &UVMap, edge: &BoundaryEdge<'_>, tolerance: f64) -> Vec<TracedBoundary> {
    let vertices = mesh.vertices();
    let on_edge: Vec<bool> = vertices
        .iter()
        .map(|p| edge.shape.is_inside(p, tolerance))
        .collect();

    let mut segments = edge_segments(mesh.triangles(), &on_edge);
    let Some(&first) = segments.first() else {
        return Vec::new();
    };

    let shared = mesh
        .triangles()
        .iter()
        .filter(|tri| tri.contains(&first.0) && tri.contains(&first.1))
        .count();
    let interior = shared >= 2;
    let copies = if interior { 1 } else { edge.included_faces.max(1) };

    let start = edge.shape.start_point();
    let end = edge.shape.end_point();
    let is_end = |v: usize| (vertices[v] - end).norm() <= tolerance;

    let mut traced = Vec::with_capacity(copies);
    for _ in 0..copies {
        let Some(path) = walk(vertices, &mut segments, &start, &is_end) else {
            break;
        };
        traced.push(TracedBoundary {
            edge: edge.id.clone(),
            points: path.iter().map(|&v| uv.get(v)).collect(),
            vertices: path,
            interior,
        });
    }
    traced
}

/// Triangle edges with both ends on the topological edge, without duplicates,
/// in order of first appearance.
fn edge_segments(triangles: &[[usize; 3]], on_edge: &[bool]) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    let mut segments = Vec::new();
    for tri in triangles {
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            let (a, b) = (tri[i], tri[j]);
            if on_edge[a] && on_edge[b] && seen.insert((a.min(b), a.max(b))) {
                segments.push((a, b));
            }
        }
    }
    segments
}

/// Chain segments into one path, consuming them.
///
/// Starts at the segment vertex nearest to `start` and stops on an end
/// vertex (after at least one step) or when no segment continues the path.
fn walk(
    vertices: &[Point3<f64>],
    segments: &mut Vec<(usize, usize)>,
    start: &Point3<f64>,
    is_end: impl Fn(usize) -> bool,
) -> Option<Vec<usize>> {
    let mut current = segments
        .iter()
        .flat_map(|&(a, b)| [a, b])
        .min_by(|&a, &b| {
            let da = (vertices[a] - start).norm_squared();
            let db = (vertices[b] - start).norm_squared();
            da.total_cmp(&db)
        })?;

    let mut path = vec![current];
    let mut previous = None;

    while !segments.is_empty() && (path.len() <= 1 || !is_end(current)) {
        let next = segments
            .iter()
            .enumerate()
            .filter_map(|(i, &(a, b))| {
                let other = match (a == current, b == current) {
                    (true, _) => b,
                    (_, true) => a,
                    _ => return None,
                };
                let length = (vertices[other] - vertices[current]).norm_squared();
                Some((i, other, Some(other) == previous, length))
            })
            .min_by(|x, y| x.2.cmp(&y.2).then(x.3.total_cmp(&y.3)));

        match next {
            Some((i, other, _, _)) => {
                segments.swap_remove(i);
                previous = Some(current);
                current = other;
                path.push(current);
            }
            None => {
                // Jump to a segment that reaches the end.
                let Some(i) = segments.iter().position(|&(a, b)| is_end(a) || is_end(b)) else {
                    break;
                };
                let (a, b) = segments.swap_remove(i);
                let (from, to) = if is_end(b) { (a, b) } else { (b, a) };
                path.push(from);
                path.push(to);
                previous = Some(from);
                current = to;
            }
        }
    }

    Some(path)
}

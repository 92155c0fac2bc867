//! Assembling per-face tessellations into one seam-consistent mesh.

use std::collections::HashSet;

use nalgebra::{Point2, Point3};

use super::disambiguate::{unlink_edge_nodes, DisambiguateOptions};
use super::fuse::{fuse_seam, FuseOptions};
use crate::error::{warn, Result, Warning};
use crate::geometry::{EdgeShape, ParametricSurface};
use crate::mesh::TriMesh;

/// The tessellation of a single CAD face.
pub struct FaceTessellation<'a> {
    /// Face identity, used to detect repeated references.
    pub id: String,
    /// Tessellation vertices.
    pub vertices: Vec<Point3<f64>>,
    /// Tessellation triangles, indexing `vertices`.
    pub triangles: Vec<[usize; 3]>,
    /// UV nodes reported by the tessellator. Empty when unavailable.
    pub uv_nodes: Vec<Point2<f64>>,
    /// Analytic surface of the face, needed to split self-seams.
    pub surface: Option<&'a dyn ParametricSurface>,
}

impl<'a> FaceTessellation<'a> {
    /// A face without parametric information.
    pub fn new(id: impl Into<String>, vertices: Vec<Point3<f64>>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            id: id.into(),
            vertices,
            triangles,
            uv_nodes: Vec::new(),
            surface: None,
        }
    }

    /// Attach the surface and its UV nodes so self-seams can be split.
    pub fn with_surface(mut self, surface: &'a dyn ParametricSurface, uv_nodes: Vec<Point2<f64>>) -> Self {
        self.surface = Some(surface);
        self.uv_nodes = uv_nodes;
        self
    }
}

/// A topological edge along which neighbouring faces are joined.
pub struct SeamEdge<'a> {
    /// Edge identity, used to detect repeated references.
    pub id: String,
    /// Geometric classification of the edge.
    pub shape: &'a dyn EdgeShape,
}

impl<'a> SeamEdge<'a> {
    pub fn new(id: impl Into<String>, shape: &'a dyn EdgeShape) -> Self {
        Self { id: id.into(), shape }
    }
}

/// Options for face assembly.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    pub fuse: FuseOptions,
    pub disambiguate: DisambiguateOptions,
}

/// Combine face tessellations into a single mesh.
///
/// Every face with a surface and UV nodes has its self-seams split first.
/// The faces are then concatenated and each seam edge is fused in turn.
/// A face or edge listed twice is reported as a warning and used once.
///
/// # Errors
///
/// Returns an error if the combined mesh is invalid, e.g. no face has any
/// triangle.
pub fn assemble_face_mesh(
    faces: &[FaceTessellation<'_>],
    seams: &[SeamEdge<'_>],
    options: &AssembleOptions,
) -> Result<TriMesh> {
    let mut seen_faces = HashSet::new();
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut triangles: Vec<[usize; 3]> = Vec::new();

    for face in faces {
        if !seen_faces.insert(face.id.as_str()) {
            warn(&Warning::RepeatedFace(face.id.clone()));
            continue;
        }

        let (face_vertices, face_triangles) = match face.surface {
            Some(surface) if !face.uv_nodes.is_empty() => {
                let unlinked = unlink_edge_nodes(
                    surface,
                    &face.vertices,
                    &face.uv_nodes,
                    &face.triangles,
                    &options.disambiguate,
                );
                (unlinked.vertices, unlinked.triangles)
            }
            _ => (face.vertices.clone(), face.triangles.clone()),
        };

        let offset = vertices.len();
        vertices.extend(face_vertices);
        triangles.extend(face_triangles.iter().map(|tri| tri.map(|v| v + offset)));
    }

    let mut seen_edges = HashSet::new();
    for seam in seams {
        if !seen_edges.insert(seam.id.as_str()) {
            warn(&Warning::RepeatedEdge(seam.id.clone()));
            continue;
        }
        let (fused_vertices, fused_triangles) =
            fuse_seam(&vertices, &triangles, seam.shape, &options.fuse);
        vertices = fused_vertices;
        triangles = fused_triangles;
    }

    log::debug!(
        "assembled {} faces into {} vertices, {} triangles",
        seen_faces.len(),
        vertices.len(),
        triangles.len()
    );

    TriMesh::new(vertices, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnwrapError;
    use crate::geometry::LineSegment;

    fn square(id: &str, x0: f64) -> FaceTessellation<'static> {
        FaceTessellation::new(
            id,
            vec![
                Point3::new(x0, 0.0, 0.0),
                Point3::new(x0 + 1.0, 0.0, 0.0),
                Point3::new(x0 + 1.0, 1.0, 0.0),
                Point3::new(x0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_two_faces_one_seam() {
        let shared = LineSegment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let faces = [square("Face1", 0.0), square("Face2", 1.0)];
        let seams = [SeamEdge::new("Edge2", &shared)];

        let mesh = assemble_face_mesh(&faces, &seams, &AssembleOptions::default()).unwrap();
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_triangles(), 4);
        assert!((mesh.surface_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_without_seams_faces_stay_apart() {
        let faces = [square("Face1", 0.0), square("Face2", 1.0)];
        let mesh = assemble_face_mesh(&faces, &[], &AssembleOptions::default()).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.triangles()[2], [4, 5, 6]);
    }

    #[test]
    fn test_repeated_references_are_skipped() {
        let shared = LineSegment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
        let faces = [square("Face1", 0.0), square("Face1", 0.0), square("Face2", 1.0)];
        let seams = [SeamEdge::new("Edge2", &shared), SeamEdge::new("Edge2", &shared)];

        let mesh = assemble_face_mesh(&faces, &seams, &AssembleOptions::default()).unwrap();
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_triangles(), 4);
    }

    #[test]
    fn test_cylinder_face_keeps_its_closing_seam_open() {
        use crate::geometry::CylinderSurface;
        use std::f64::consts::FRAC_PI_2;

        // Unit cylinder as 4 columns by 1 row, UV nodes on both sides of u = 0.
        let cyl = CylinderSurface { radius: 1.0 };
        let mut ring_vertices = Vec::new();
        let mut nodes = Vec::new();
        for r in 0..2 {
            for c in 0..4 {
                ring_vertices.push(cyl.value_at(c as f64 * FRAC_PI_2, r as f64));
            }
            for k in 0..=4 {
                nodes.push(Point2::new(k as f64 * FRAC_PI_2, r as f64));
            }
        }
        let mut ring_triangles = Vec::new();
        for c in 0..4 {
            let c2 = (c + 1) % 4;
            ring_triangles.push([c, c2, c2 + 4]);
            ring_triangles.push([c, c2 + 4, c + 4]);
        }

        // A flat fin standing out from the cylinder along u = π/2.
        let fin = FaceTessellation::new(
            "Fin",
            vec![
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let faces = [
            FaceTessellation::new("Ring", ring_vertices, ring_triangles).with_surface(&cyl, nodes),
            fin,
        ];
        let joint = LineSegment::new(Point3::new(0.0, 1.0, 0.0), Point3::new(0.0, 1.0, 1.0));
        let seams = [SeamEdge::new("Joint", &joint)];

        let mesh = assemble_face_mesh(&faces, &seams, &AssembleOptions::default()).unwrap();

        // 8 ring vertices, 2 more from splitting u = 0, 4 fin vertices, 2 fused.
        assert_eq!(mesh.num_vertices(), 12);
        assert_eq!(mesh.num_triangles(), 10);

        let copies = |p: Point3<f64>| {
            mesh.vertices()
                .iter()
                .filter(|v| (*v - p).norm() < 1e-9)
                .count()
        };
        assert_eq!(copies(Point3::new(1.0, 0.0, 0.0)), 2);
        assert_eq!(copies(Point3::new(1.0, 0.0, 1.0)), 2);
        assert_eq!(copies(Point3::new(0.0, 1.0, 0.0)), 1);
        assert_eq!(copies(Point3::new(0.0, 1.0, 1.0)), 1);

        // The closing seam stays open, so the ring has a boundary along it.
        assert!(mesh
            .boundary_edges()
            .iter()
            .any(|&(a, b)| (mesh.vertices()[a].x - 1.0).abs() < 1e-9
                && (mesh.vertices()[b].x - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_no_faces() {
        assert!(matches!(
            assemble_face_mesh(&[], &[], &AssembleOptions::default()),
            Err(UnwrapError::EmptyMesh)
        ));
    }
}

//! Least Squares Conformal Maps (LSCM) parameterization.
//!
//! LSCM computes a conformal (angle-preserving) parameterization of a triangle
//! mesh. Every triangle contributes one complex equation `Σ w_k U_k = 0`,
//! where `U_k = u_k + i v_k` and the weights are built from the triangle's
//! local 2D frame. At least two pinned vertices remove the similarity
//! transform freedom; the remaining unknowns are found in the least-squares
//! sense.
//!
//! # References
//!
//! - Lévy, B., Petitjean, S., Ray, N., & Maillot, J. (2002). "Least squares
//!   conformal maps for automatic texture atlas generation." ACM SIGGRAPH.

use std::collections::HashSet;

use nalgebra::{Complex, DVector, Point2};

use crate::error::{Result, UnwrapError};
use crate::mesh::TriMesh;

use super::pins::{resolve_pins, Pin, PinOptions};
use super::sparse::{least_squares_cg, CsrMatrix};
use super::uv::UVMap;

/// Vertex count above which the solve must be explicitly allowed.
pub const LARGE_MESH_LIMIT: usize = 3000;

/// Options for LSCM parameterization.
#[derive(Debug, Clone)]
pub struct LscmOptions {
    /// Solve meshes above `large_mesh_limit` vertices.
    pub allow_large_mesh: bool,

    /// Vertex count threshold for [`UnwrapError::LargeMesh`].
    pub large_mesh_limit: usize,

    /// Maximum iterations for the least-squares solver.
    pub max_iterations: usize,

    /// Relative convergence tolerance of the least-squares solver.
    pub tolerance: f64,
}

impl Default for LscmOptions {
    fn default() -> Self {
        Self {
            allow_large_mesh: false,
            large_mesh_limit: LARGE_MESH_LIMIT,
            max_iterations: 10_000,
            tolerance: 1e-10,
        }
    }
}

impl LscmOptions {
    /// Allow or forbid solving large meshes.
    pub fn with_allow_large_mesh(mut self, allow: bool) -> Self {
        self.allow_large_mesh = allow;
        self
    }

    /// Set the large mesh threshold.
    pub fn with_large_mesh_limit(mut self, limit: usize) -> Self {
        self.large_mesh_limit = limit;
        self
    }

    /// Set the maximum solver iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }
}

/// Compute the LSCM parameterization for explicit pins.
///
/// `pinned_vertices[i]` is fixed at `pinned_uvs[i]`; these values are
/// returned exactly. All other vertices are solved for.
///
/// # Errors
///
/// - [`UnwrapError::InvalidParameter`] if the pin lists differ in length or
///   a pinned index is out of range
/// - [`UnwrapError::Underconstrained`] for fewer than 2 pins, or pins that all
///   share one UV target
/// - [`UnwrapError::Overconstrained`] if a vertex is pinned twice
/// - [`UnwrapError::LargeMesh`] above the vertex limit unless allowed
/// - [`UnwrapError::DegenerateTriangle`] for a zero-area triangle
/// - [`UnwrapError::ConvergenceFailed`] if the solver does not converge
///
/// # Example
///
/// ```
/// use unfurl::algo::parameterize::{lscm, LscmOptions};
/// use unfurl::mesh::TriMesh;
/// use nalgebra::{Point2, Point3};
///
/// let mesh = TriMesh::new(
///     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
///     vec![[0, 1, 2]],
/// ).unwrap();
/// let uv = lscm(&mesh, &[0, 1], &[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], &LscmOptions::default()).unwrap();
///
/// assert!((uv.get(2) - Point2::new(0.0, 1.0)).norm() < 1e-8);
/// ```
pub fn lscm(
    mesh: &TriMesh,
    pinned_vertices: &[usize],
    pinned_uvs: &[Point2<f64>],
    options: &LscmOptions,
) -> Result<UVMap> {
    validate_pins(mesh, pinned_vertices, pinned_uvs, options)?;

    let n_vertices = mesh.num_vertices();
    let n_triangles = mesh.num_triangles();

    let mut pinned: Vec<Option<Point2<f64>>> = vec![None; n_vertices];
    for (&v, &uv) in pinned_vertices.iter().zip(pinned_uvs) {
        pinned[v] = Some(uv);
    }

    // Free vertices in ascending order map to consecutive columns.
    let mut free_column = vec![None; n_vertices];
    let mut n_free = 0;
    for (v, pin) in pinned.iter().enumerate() {
        if pin.is_none() {
            free_column[v] = Some(n_free);
            n_free += 1;
        }
    }

    if n_free == 0 {
        return Ok(UVMap::new(pinned.into_iter().flatten().collect()));
    }

    log::debug!(
        "lscm: {} triangles, {} free vertices, {} pinned",
        n_triangles,
        n_free,
        pinned_vertices.len()
    );

    let (matrix, rhs) = build_system(mesh, &pinned, &free_column, n_free)?;
    let (solution, iterations) =
        least_squares_cg(&matrix, &rhs, options.max_iterations, options.tolerance)?;

    log::debug!("lscm: converged after {} iterations", iterations);

    let coords = pinned
        .iter()
        .zip(&free_column)
        .map(|(pin, column)| match (pin, column) {
            (Some(uv), _) => *uv,
            (None, Some(c)) => Point2::new(solution[*c], solution[n_free + *c]),
            (None, None) => Point2::origin(),
        })
        .collect();

    Ok(UVMap::new(coords))
}

/// Resolve `pins` on `mesh` and compute the LSCM parameterization.
///
/// Pins are resolved in declaration order; see [`resolve_pins`].
pub fn unwrap(
    mesh: &TriMesh,
    pins: &[Pin],
    pin_options: &PinOptions,
    options: &LscmOptions,
) -> Result<UVMap> {
    let resolved = resolve_pins(pins, mesh, pin_options)?;
    lscm(mesh, &resolved.vertices, &resolved.uvs, options)
}

fn validate_pins(
    mesh: &TriMesh,
    pinned_vertices: &[usize],
    pinned_uvs: &[Point2<f64>],
    options: &LscmOptions,
) -> Result<()> {
    if pinned_vertices.len() != pinned_uvs.len() {
        return Err(UnwrapError::invalid_param(
            "pinned_uvs",
            pinned_uvs.len(),
            format!("expected one UV per pinned vertex ({})", pinned_vertices.len()),
        ));
    }

    if pinned_vertices.len() < 2 {
        return Err(UnwrapError::Underconstrained(format!(
            "{} pinned vertices, at least 2 are required",
            pinned_vertices.len()
        )));
    }

    if pinned_uvs.iter().all(|uv| *uv == pinned_uvs[0]) {
        return Err(UnwrapError::Underconstrained(
            "all pinned vertices share the same UV coordinates".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(pinned_vertices.len());
    for &v in pinned_vertices {
        if !seen.insert(v) {
            return Err(UnwrapError::Overconstrained { vertex: v });
        }
    }

    if let Some(&v) = pinned_vertices.iter().find(|&&v| v >= mesh.num_vertices()) {
        return Err(UnwrapError::invalid_param(
            "pinned_vertices",
            v,
            format!("mesh has {} vertices", mesh.num_vertices()),
        ));
    }

    if mesh.num_vertices() > options.large_mesh_limit && !options.allow_large_mesh {
        return Err(UnwrapError::LargeMesh {
            vertices: mesh.num_vertices(),
            limit: options.large_mesh_limit,
        });
    }

    Ok(())
}

/// Conformal weights of one triangle, scaled by `1 / sqrt(area)`.
///
/// The triangle is laid out in a local frame with vertex 0 at the origin
/// and vertex 1 on the positive x axis.
fn triangle_weights(mesh: &TriMesh, t: usize) -> Result<[Complex<f64>; 3]> {
    let [p0, p1, p2] = mesh.triangle_points(t);
    let e1 = p1 - p0;
    let e2 = p2 - p0;

    let x1 = e1.norm();
    if x1 < 1e-12 {
        return Err(UnwrapError::DegenerateTriangle { triangle: t });
    }
    let x_dir = e1 / x1;
    let x2 = e2.dot(&x_dir);
    let y2 = (e2 - x_dir * x2).norm();

    let area = (x1 * y2 * 0.5).abs();
    if area < 1e-12 {
        return Err(UnwrapError::DegenerateTriangle { triangle: t });
    }
    let norm = area.sqrt();

    // Local corners: (0, 0), (x1, 0), (x2, y2)
    let w0 = Complex::new(x2 - x1, y2);
    let w1 = Complex::new(-x2, -y2);
    let w2 = Complex::new(x1, 0.0);
    Ok([w0 / norm, w1 / norm, w2 / norm])
}

/// Assemble the real least-squares system over the free unknowns.
///
/// Rows `0..T` hold the real parts, rows `T..2T` the imaginary parts of the
/// per-triangle equations. Columns `0..F` are the free `u`, `F..2F` the free
/// `v`. Pinned terms move to the right-hand side.
fn build_system(
    mesh: &TriMesh,
    pinned: &[Option<Point2<f64>>],
    free_column: &[Option<usize>],
    n_free: usize,
) -> Result<(CsrMatrix, DVector<f64>)> {
    let n_triangles = mesh.num_triangles();
    let mut triplets = Vec::with_capacity(n_triangles * 12);
    let mut rhs = DVector::zeros(2 * n_triangles);

    for (t, tri) in mesh.triangles().iter().enumerate() {
        let weights = triangle_weights(mesh, t)?;
        for (&v, w) in tri.iter().zip(weights) {
            if let Some(uv) = pinned[v] {
                rhs[t] -= w.re * uv.x - w.im * uv.y;
                rhs[n_triangles + t] -= w.im * uv.x + w.re * uv.y;
            } else if let Some(c) = free_column[v] {
                triplets.push((t, c, w.re));
                triplets.push((t, n_free + c, -w.im));
                triplets.push((n_triangles + t, c, w.im));
                triplets.push((n_triangles + t, n_free + c, w.re));
            }
        }
    }

    let matrix = CsrMatrix::from_triplets(2 * n_triangles, 2 * n_free, triplets);
    Ok((matrix, rhs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn create_single_triangle() -> TriMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        TriMesh::new(vertices, vec![[0, 1, 2]]).unwrap()
    }

    fn create_grid_mesh(n: usize) -> TriMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = j * (n + 1) + i + 1;
                let v01 = (j + 1) * (n + 1) + i;
                let v11 = (j + 1) * (n + 1) + i + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        TriMesh::new(vertices, faces).unwrap()
    }

    fn origin_and_unit_x() -> [Point2<f64>; 2] {
        [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]
    }

    #[test]
    fn test_single_triangle_is_isometric() {
        let mesh = create_single_triangle();
        let uv = lscm(&mesh, &[0, 1], &origin_and_unit_x(), &LscmOptions::default()).unwrap();

        assert_eq!(uv.len(), 3);
        assert_eq!(uv.get(0), Point2::new(0.0, 0.0));
        assert_eq!(uv.get(1), Point2::new(1.0, 0.0));
        assert!((uv.get(2) - Point2::new(0.0, 1.0)).norm() < 1e-8);
    }

    #[test]
    fn test_flat_grid_reproduces_plane() {
        let mesh = create_grid_mesh(3);
        let pins = [Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)];
        let uv = lscm(&mesh, &[0, 3], &pins, &LscmOptions::default()).unwrap();

        assert_eq!(uv.len(), 16);
        for (v, p) in mesh.vertices().iter().enumerate() {
            let got = uv.get(v);
            assert!((got.x - p.x).abs() < 1e-6, "vertex {}: {:?}", v, got);
            assert!((got.y - p.y).abs() < 1e-6, "vertex {}: {:?}", v, got);
        }
    }

    #[test]
    fn test_pins_are_exact_in_any_order() {
        let mesh = create_grid_mesh(2);
        let pins = [Point2::new(0.25, 0.75), Point2::new(-1.0, 0.5)];
        let uv = lscm(&mesh, &[8, 0], &pins, &LscmOptions::default()).unwrap();

        assert_eq!(uv.get(8), pins[0]);
        assert_eq!(uv.get(0), pins[1]);
    }

    #[test]
    fn test_similarity_is_preserved() {
        // Pinning a rotated and scaled edge rotates and scales the whole map.
        let mesh = create_grid_mesh(2);
        let pins = [Point2::new(0.0, 0.0), Point2::new(0.0, 4.0)];
        let uv = lscm(&mesh, &[0, 2], &pins, &LscmOptions::default()).unwrap();

        // x axis maps to +v, y axis maps to -u at twice the size.
        let far = uv.get(8);
        assert!((far.x + 4.0).abs() < 1e-6);
        assert!((far.y - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_pinned() {
        let mesh = create_single_triangle();
        let pins = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 2.0)];
        let uv = lscm(&mesh, &[2, 0, 1], &pins, &LscmOptions::default()).unwrap();
        assert_eq!(uv.as_slice(), &[pins[1], pins[2], pins[0]]);
    }

    #[test]
    fn test_too_few_pins() {
        let mesh = create_single_triangle();
        let result = lscm(&mesh, &[0], &[Point2::new(0.0, 0.0)], &LscmOptions::default());
        assert!(matches!(result, Err(UnwrapError::Underconstrained(_))));

        let result = lscm(&mesh, &[], &[], &LscmOptions::default());
        assert!(matches!(result, Err(UnwrapError::Underconstrained(_))));
    }

    #[test]
    fn test_identical_pin_targets() {
        let mesh = create_single_triangle();
        let same = [Point2::new(0.5, 0.5), Point2::new(0.5, 0.5)];
        let result = lscm(&mesh, &[0, 1], &same, &LscmOptions::default());
        assert!(matches!(result, Err(UnwrapError::Underconstrained(_))));
    }

    #[test]
    fn test_duplicate_pin() {
        let mesh = create_single_triangle();
        let result = lscm(&mesh, &[1, 1], &origin_and_unit_x(), &LscmOptions::default());
        match result {
            Err(UnwrapError::Overconstrained { vertex }) => assert_eq!(vertex, 1),
            other => panic!("expected Overconstrained, got {:?}", other),
        }
    }

    #[test]
    fn test_pin_out_of_range() {
        let mesh = create_single_triangle();
        let result = lscm(&mesh, &[0, 7], &origin_and_unit_x(), &LscmOptions::default());
        assert!(matches!(result, Err(UnwrapError::InvalidParameter { .. })));

        let result = lscm(&mesh, &[0, 1], &[Point2::origin()], &LscmOptions::default());
        assert!(matches!(result, Err(UnwrapError::InvalidParameter { .. })));
    }

    #[test]
    fn test_large_mesh_guard() {
        let mesh = create_grid_mesh(3);
        let strict = LscmOptions::default().with_large_mesh_limit(10);
        match lscm(&mesh, &[0, 3], &origin_and_unit_x(), &strict) {
            Err(UnwrapError::LargeMesh { vertices, limit }) => {
                assert_eq!(vertices, 16);
                assert_eq!(limit, 10);
            }
            other => panic!("expected LargeMesh, got {:?}", other),
        }

        let allowed = strict.with_allow_large_mesh(true);
        assert!(lscm(&mesh, &[0, 3], &origin_and_unit_x(), &allowed).is_ok());
    }

    #[test]
    fn test_degenerate_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = TriMesh::new(vertices, vec![[0, 1, 3], [0, 1, 2]]).unwrap();
        let result = lscm(&mesh, &[0, 1], &origin_and_unit_x(), &LscmOptions::default());
        assert!(matches!(result, Err(UnwrapError::DegenerateTriangle { triangle: 1 })));
    }

    #[test]
    fn test_weights_sum_to_zero() {
        let mesh = create_single_triangle();
        let w = triangle_weights(&mesh, 0).unwrap();
        let sum = w[0] + w[1] + w[2];
        assert!(sum.norm() < 1e-12);
    }
}

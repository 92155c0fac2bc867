//! Triangle mesh containers.
//!
//! Unwrapping works on plain indexed triangle lists as produced by a
//! tessellator: an ordered list of 3D points and an ordered list of vertex
//! index triples.
//!
//! - [`TriMesh`] is the validated container consumed by the solvers.
//! - [`IndexCache`] hands out sequential indices to keys on first use and is
//!   the building block for every re-indexing pass (seam fusion, seam
//!   disambiguation, face assembly).
//!
//! ```
//! use unfurl::mesh::TriMesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = TriMesh::new(vertices, vec![[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_vertices(), 3);
//! assert!((mesh.surface_area() - 0.5).abs() < 1e-12);
//! ```

mod index_cache;
mod trimesh;

pub use index_cache::IndexCache;
pub use trimesh::TriMesh;

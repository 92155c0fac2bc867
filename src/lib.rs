//! # Unfurl
//!
//! UV unwrapping and texture packing for tessellated CAD geometry.
//!
//! Unfurl turns the per-face tessellation of a B-rep feature into one
//! seam-consistent triangle mesh, flattens it into UV coordinates with a
//! least squares conformal map, and packs several flattened islands into a
//! bounded texture.
//!
//! ## Features
//!
//! - **Seam handling**: fusing duplicated seam vertices and splitting
//!   vertices that sit on both sides of a periodic surface seam
//! - **Unwrapping**: LSCM with pinned vertices or edges, planar projection
//! - **Boundary tracing**: seam and outline polylines in UV space
//! - **Packing**: corner-aligned rectangle packing with automatic scaling
//! - **File formats**: STL and PLY, with texture coordinates in PLY
//!
//! ## Quick Start
//!
//! ```
//! use unfurl::prelude::*;
//! use unfurl::algo::pack::{pack_meshes, PackOptions};
//! use unfurl::algo::parameterize::UnwrapMethod;
//! use nalgebra::{Point2, Point3};
//!
//! let mesh = TriMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(2.0, 0.0, 0.0),
//!         Point3::new(2.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! ).unwrap();
//!
//! let mut island = UVMesh::new("Face1", mesh);
//! island.unwrap_with(&UnwrapMethod::lscm(vec![
//!     Pin::vertex(Point3::new(0.0, 0.0, 0.0), Point2::new(0.0, 0.0)),
//!     Pin::vertex(Point3::new(2.0, 0.0, 0.0), Point2::new(1.0, 0.0)),
//! ])).unwrap();
//!
//! let packing = pack_meshes(&[island.clone()], &PackOptions::default()).unwrap();
//! let uv = packing.layout.texture_coordinates(&island).unwrap();
//! assert_eq!(uv.len(), 4);
//! ```

#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use unfurl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::pack::{Layout, LayoutTransform};
    pub use crate::algo::parameterize::{CollisionPolicy, Pin, UVMap, UVMesh};
    pub use crate::error::{Result, UnwrapError};
    pub use crate::mesh::TriMesh;
}

// Re-export nalgebra types for convenience
pub use nalgebra;

//! Seam preprocessing of raw tessellations.
//!
//! - [`fuse_seam`] joins two faces along a shared topological edge.
//! - [`unlink_edge_nodes`] splits a face along its own closing edge.
//! - [`assemble_face_mesh`] runs both over a set of faces.

mod assemble;
mod disambiguate;
mod fuse;

pub use assemble::{assemble_face_mesh, AssembleOptions, FaceTessellation, SeamEdge};
pub use disambiguate::{match_nodes, unlink_edge_nodes, DisambiguateOptions, UnlinkedMesh};
pub use fuse::{fuse_seam, FuseOptions};

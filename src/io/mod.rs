//! Mesh file I/O.
//!
//! Meshes are read into a [`TriMesh`]. Unwrapped meshes can be written back
//! out as PLY with per-vertex texture coordinates.
//!
//! | Format | Extension | Load | Save | UVs |
//! |--------|-----------|------|------|-----|
//! | STL | `.stl` | ✓ | ✓ | ✗ |
//! | PLY | `.ply` | ✓ | ✓ | ✓ |
//!
//! ```no_run
//! use unfurl::io::{load, save};
//!
//! let mesh = load("part.stl").unwrap();
//! save(&mesh, "part.ply").unwrap();
//! ```

pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{Result, UnwrapError};
use crate::mesh::TriMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Stl,
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| UnwrapError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh, choosing the format by file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh, choosing the format by file extension.
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Stl => stl::save(mesh, path),
        Format::Ply => ply::save(mesh, None, path),
    }
}

//! Error types for unfurl.
//!
//! Hard failures are returned as [`UnwrapError`]. Recoverable conditions are
//! described by [`Warning`] and only ever logged.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`UnwrapError`].
pub type Result<T> = std::result::Result<T, UnwrapError>;

/// Errors that can occur while unwrapping or packing.
#[derive(Error, Debug)]
pub enum UnwrapError {
    /// The pin constraints do not determine a unique solution.
    #[error("underconstrained mesh: {0}")]
    Underconstrained(String),

    /// A single vertex received more than one pin.
    #[error("overconstrained mesh: vertex {vertex} is pinned more than once")]
    Overconstrained {
        /// The multiply pinned vertex.
        vertex: usize,
    },

    /// A reference does not resolve to the expected kind of feature.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The mesh exceeds the vertex limit and large meshes were not allowed.
    #[error(
        "mesh has {vertices} vertices, more than the allowed {limit}; \
         reduce the mesh detail or allow large meshes"
    )]
    LargeMesh {
        /// Vertex count of the mesh.
        vertices: usize,
        /// The configured limit.
        limit: usize,
    },

    /// No layout was found within the iteration budget.
    #[error("could not find a valid packing after {iterations} attempts")]
    PackingFailed {
        /// Number of attempts made.
        iterations: usize,
    },

    /// The requested operation exists but is not implemented.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A triangle references an invalid vertex index.
    #[error("triangle {triangle} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The triangle index.
        triangle: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A triangle has zero area or repeated vertices.
    #[error("triangle {triangle} is degenerate")]
    DegenerateTriangle {
        /// The triangle index.
        triangle: usize,
    },

    /// The iterative solver did not converge.
    #[error("solver failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl UnwrapError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: fmt::Display>(
        name: &'static str,
        value: T,
        reason: impl Into<String>,
    ) -> Self {
        UnwrapError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Recoverable conditions that are reported but never abort an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The same feature was referenced more than once.
    RepeatedFeature(String),
    /// The same face was referenced more than once.
    RepeatedFace(String),
    /// The same edge was referenced more than once.
    RepeatedEdge(String),
    /// A seam edge had no partner and was left unfused.
    UnfusedEdge {
        /// First vertex of the mesh edge.
        v0: usize,
        /// Second vertex of the mesh edge.
        v1: usize,
    },
    /// A topological edge has no triangle segments on it.
    EdgeWithoutSegments(String),
    /// An unknown pin collision policy name.
    InvalidCollisionPolicy(String),
    /// UV coordinates that do not cover the mesh; nothing was traced.
    UvMismatch {
        /// Number of mesh vertices.
        expected: usize,
        /// Number of UV coordinates supplied.
        actual: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::RepeatedFeature(id) => write!(f, "RepeatedFeatureWarning: {id}"),
            Warning::RepeatedFace(id) => write!(f, "RepeatedFaceWarning: {id}"),
            Warning::RepeatedEdge(id) => write!(f, "RepeatedEdgeWarning: {id}"),
            Warning::UnfusedEdge { v0, v1 } => {
                write!(f, "UnfusedEdgeWarning: mesh edge ({v0}, {v1}) has no fuse partner")
            }
            Warning::EdgeWithoutSegments(id) => {
                write!(f, "EdgeWithoutSegmentsWarning: {id}")
            }
            Warning::InvalidCollisionPolicy(name) => {
                write!(f, "InvalidCollisionPolicyWarning: {name}")
            }
            Warning::UvMismatch { expected, actual } => {
                write!(f, "UvMismatchWarning: {actual} UV coordinates for {expected} vertices")
            }
        }
    }
}

/// Log a [`Warning`] through the `log` facade.
pub fn warn(warning: &Warning) {
    log::warn!("{warning}");
}

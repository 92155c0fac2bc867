//! Unwrap method selection.

use crate::error::Result;
use crate::mesh::TriMesh;

use super::lscm::{unwrap, LscmOptions};
use super::pins::{Pin, PinOptions};
use super::plane::PlaneProjection;
use super::uv::UVMap;

/// Anything that turns a mesh into UV coordinates.
pub trait Unwrapper {
    /// Compute one UV coordinate per mesh vertex.
    fn unwrap(&self, mesh: &TriMesh) -> Result<UVMap>;

    /// Short name for logs and UIs.
    fn name(&self) -> &'static str;
}

/// The built-in unwrap methods.
#[derive(Debug, Clone)]
pub enum UnwrapMethod {
    /// Projection onto a plane.
    Plane(PlaneProjection),
    /// Least squares conformal map with pins.
    Lscm {
        pins: Vec<Pin>,
        pin_options: PinOptions,
        options: LscmOptions,
    },
}

impl UnwrapMethod {
    /// LSCM with default options.
    pub fn lscm(pins: Vec<Pin>) -> Self {
        Self::Lscm {
            pins,
            pin_options: PinOptions::default(),
            options: LscmOptions::default(),
        }
    }
}

impl Unwrapper for UnwrapMethod {
    fn unwrap(&self, mesh: &TriMesh) -> Result<UVMap> {
        log::debug!("unwrapping {} vertices with {}", mesh.num_vertices(), self.name());
        match self {
            Self::Plane(projection) => projection.project(mesh),
            Self::Lscm {
                pins,
                pin_options,
                options,
            } => unwrap(mesh, pins, pin_options, options),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Plane(_) => "plane",
            Self::Lscm { .. } => "lscm",
        }
    }
}

//! Planar projection.
//!
//! The simplest unwrap: every vertex is projected onto a plane. Exact for
//! flat faces, and a cheap fallback for nearly flat ones.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{Result, UnwrapError};
use crate::mesh::TriMesh;

use super::uv::UVMap;

/// How the in-plane axes are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaneAxes {
    /// Plane normal only; the u axis is chosen horizontal, `(-n.y, n.x, 0)`,
    /// or world x for a vertical normal.
    Normal(Vector3<f64>),
    /// Plane normal and an explicit u axis.
    NormalAndU {
        normal: Vector3<f64>,
        u: Vector3<f64>,
    },
    /// Explicit u and v axes.
    Explicit { u: Vector3<f64>, v: Vector3<f64> },
}

/// Projection onto a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneProjection {
    /// Point mapped to UV `(0, 0)`.
    pub origin: Point3<f64>,
    pub axes: PlaneAxes,
    /// Rotation of the axes within the plane, in degrees.
    pub angle_deg: f64,
}

impl PlaneProjection {
    /// Projection along `normal` through the world origin.
    pub fn new(normal: Vector3<f64>) -> Self {
        Self {
            origin: Point3::origin(),
            axes: PlaneAxes::Normal(normal),
            angle_deg: 0.0,
        }
    }

    pub fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_axes(mut self, axes: PlaneAxes) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_angle(mut self, angle_deg: f64) -> Self {
        self.angle_deg = angle_deg;
        self
    }

    /// The u and v directions after applying the rotation angle.
    ///
    /// # Errors
    ///
    /// [`UnwrapError::InvalidParameter`] for a zero length axis or normal.
    pub fn directions(&self) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let (x_dir, y_dir) = match self.axes {
            PlaneAxes::Normal(normal) => {
                let normal = unit(normal, "normal")?;
                let x_dir = Vector3::new(-normal.y, normal.x, 0.0)
                    .try_normalize(1e-12)
                    .unwrap_or_else(Vector3::x);
                (x_dir, unit(normal.cross(&x_dir), "normal")?)
            }
            PlaneAxes::NormalAndU { normal, u } => {
                let x_dir = unit(u, "u")?;
                (x_dir, unit(normal.cross(&x_dir), "normal")?)
            }
            PlaneAxes::Explicit { u, v } => (unit(u, "u")?, unit(v, "v")?),
        };

        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        Ok((x_dir * cos + y_dir * sin, y_dir * cos - x_dir * sin))
    }

    /// Project every mesh vertex.
    pub fn project(&self, mesh: &TriMesh) -> Result<UVMap> {
        let (u_dir, v_dir) = self.directions()?;
        let coords = mesh
            .vertices()
            .iter()
            .map(|p| {
                let d = p - self.origin;
                Point2::new(d.dot(&u_dir), d.dot(&v_dir))
            })
            .collect();
        Ok(UVMap::new(coords))
    }
}

fn unit(v: Vector3<f64>, name: &'static str) -> Result<Vector3<f64>> {
    v.try_normalize(1e-12).ok_or_else(|| {
        UnwrapError::invalid_param(name, format!("{:?}", v.as_slice()), "must not be zero length")
    })
}

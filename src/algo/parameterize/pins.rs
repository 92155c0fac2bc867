//! Pin constraints and their resolution to mesh vertices.
//!
//! A pin fixes a topological feature at a UV position. Tessellation may have
//! several coincident vertices at a pinned point (a vertex where a seam was
//! cut open), so a pin resolves to a set of vertices, ordered along the pin's
//! order vector, and its [`CollisionPolicy`] decides which of them are pinned
//! and where.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::error::{warn, Result, UnwrapError, Warning};
use crate::geometry::{PointVertex, VertexShape};
use crate::mesh::TriMesh;

/// How coincident vertices of one pin are constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Only the first vertex in order is pinned, at `uv0`.
    #[default]
    FirstOnly,
    /// Every coincident vertex is pinned at `uv0`.
    AllSame,
    /// The i-th vertex is pinned at `uv0 + i (uv1 - uv0)`.
    IncreasingLinear,
}

impl FromStr for CollisionPolicy {
    type Err = UnwrapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first only" | "first-only" => Ok(Self::FirstOnly),
            "all same" | "all-same" => Ok(Self::AllSame),
            "increasing linear" | "increasing-linear" => Ok(Self::IncreasingLinear),
            _ => Err(UnwrapError::invalid_param(
                "collision_policy",
                s,
                "expected 'first only', 'all same' or 'increasing linear'",
            )),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstOnly => "first only",
            Self::AllSame => "all same",
            Self::IncreasingLinear => "increasing linear",
        };
        f.write_str(name)
    }
}

/// The feature a pin refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinFeature {
    /// A topological vertex at the given position.
    Vertex(Point3<f64>),
    /// A topological edge. Edge pins are not supported yet.
    Edge {
        start: Point3<f64>,
        end: Point3<f64>,
    },
}

/// A pin constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub feature: PinFeature,
    /// Target of the first (or only) pinned vertex.
    pub uv0: Point2<f64>,
    /// Second point of the target segment, used by
    /// [`CollisionPolicy::IncreasingLinear`].
    pub uv1: Point2<f64>,
    pub policy: CollisionPolicy,
    /// Direction along which coincident vertices are ordered.
    pub order: Vector3<f64>,
}

impl Pin {
    /// Pin a vertex at `uv` with [`CollisionPolicy::FirstOnly`].
    pub fn vertex(position: Point3<f64>, uv: Point2<f64>) -> Self {
        Self {
            feature: PinFeature::Vertex(position),
            uv0: uv,
            uv1: uv + Vector2::new(1.0, 0.0),
            policy: CollisionPolicy::FirstOnly,
            order: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Build a pin from loosely typed settings.
    ///
    /// `uvs` is `[u0, v0, u1, v1]`. An unknown policy name is reported as a
    /// [`Warning::InvalidCollisionPolicy`] and the pin falls back to
    /// [`CollisionPolicy::FirstOnly`].
    pub fn from_settings(feature: PinFeature, uvs: [f64; 4], policy: &str, order: Vector3<f64>) -> Self {
        let policy = policy.parse().unwrap_or_else(|_| {
            warn(&Warning::InvalidCollisionPolicy(policy.to_string()));
            CollisionPolicy::FirstOnly
        });
        Self {
            feature,
            uv0: Point2::new(uvs[0], uvs[1]),
            uv1: Point2::new(uvs[2], uvs[3]),
            policy,
            order,
        }
    }

    /// Set the target segment end.
    pub fn with_uv1(mut self, uv1: Point2<f64>) -> Self {
        self.uv1 = uv1;
        self
    }

    /// Set the collision policy.
    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the order vector.
    pub fn with_order(mut self, order: Vector3<f64>) -> Self {
        self.order = order;
        self
    }
}

/// Options for pin resolution.
#[derive(Debug, Clone)]
pub struct PinOptions {
    /// Distance within which a mesh vertex coincides with the pinned feature.
    pub tolerance: f64,
}

impl Default for PinOptions {
    fn default() -> Self {
        Self { tolerance: 1e-3 }
    }
}

impl PinOptions {
    /// Set the coincidence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Pinned vertices and their UV targets, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPins {
    pub vertices: Vec<usize>,
    pub uvs: Vec<Point2<f64>>,
}

impl ResolvedPins {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Resolve a single pin, skipping vertices in `ignored`.
///
/// # Errors
///
/// [`UnwrapError::NotImplemented`] for edge pins.
pub fn resolve_pin(
    pin: &Pin,
    mesh: &TriMesh,
    ignored: &HashSet<usize>,
    options: &PinOptions,
) -> Result<ResolvedPins> {
    let reference = match pin.feature {
        PinFeature::Vertex(p) => PointVertex(p),
        PinFeature::Edge { .. } => return Err(UnwrapError::NotImplemented("edge pins")),
    };

    let mut coincident: Vec<(usize, f64)> = mesh
        .vertices()
        .iter()
        .enumerate()
        .filter(|(i, p)| !ignored.contains(i) && reference.is_inside(p, options.tolerance))
        .map(|(i, p)| {
            let bias = mesh
                .first_triangle_with(i)
                .map(|t| mesh.triangle_centroid(t))
                .unwrap_or(*p);
            (i, (bias - reference.point()).dot(&pin.order))
        })
        .collect();
    coincident.sort_by(|a, b| a.1.total_cmp(&b.1));

    let step = pin.uv1 - pin.uv0;
    let mut resolved = ResolvedPins::default();
    for (i, &(vertex, _)) in coincident.iter().enumerate() {
        let uv = match pin.policy {
            CollisionPolicy::FirstOnly | CollisionPolicy::AllSame => pin.uv0,
            CollisionPolicy::IncreasingLinear => pin.uv0 + step * i as f64,
        };
        resolved.vertices.push(vertex);
        resolved.uvs.push(uv);
        if pin.policy == CollisionPolicy::FirstOnly {
            break;
        }
    }

    if resolved.is_empty() {
        log::debug!("pin at {:?} matched no vertex", reference.point());
    }
    Ok(resolved)
}

/// Resolve pins in declaration order.
///
/// A vertex claimed by an earlier pin is not considered by later ones.
pub fn resolve_pins(pins: &[Pin], mesh: &TriMesh, options: &PinOptions) -> Result<ResolvedPins> {
    let mut claimed = HashSet::new();
    let mut all = ResolvedPins::default();
    for pin in pins {
        let resolved = resolve_pin(pin, mesh, &claimed, options)?;
        claimed.extend(resolved.vertices.iter().copied());
        all.vertices.extend(resolved.vertices);
        all.uvs.extend(resolved.uvs);
    }
    log::debug!("resolved {} pins to {} vertices", pins.len(), all.len());
    Ok(all)
}

//! UV parameterization.
//!
//! This module computes UV coordinates (a 2D parameterization) for triangle
//! meshes and wraps the result into packable islands.
//!
//! # Available Methods
//!
//! - [`lscm`]: Least Squares Conformal Maps with explicit pinned vertices;
//!   [`unwrap`] resolves [`Pin`]s first.
//! - [`PlaneProjection`]: projection onto a plane.
//!
//! Both are available behind the [`Unwrapper`] trait through [`UnwrapMethod`].
//!
//! # Example
//!
//! ```
//! use unfurl::algo::parameterize::{Unwrapper, UnwrapMethod, Pin};
//! use unfurl::mesh::TriMesh;
//! use nalgebra::{Point2, Point3};
//!
//! let mesh = TriMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! ).unwrap();
//!
//! let method = UnwrapMethod::lscm(vec![
//!     Pin::vertex(Point3::new(0.0, 0.0, 0.0), Point2::new(0.0, 0.0)),
//!     Pin::vertex(Point3::new(1.0, 0.0, 0.0), Point2::new(1.0, 0.0)),
//! ]);
//! let uv = method.unwrap(&mesh).unwrap();
//!
//! for (v, p) in uv.iter() {
//!     println!("vertex {}: u={:.3}, v={:.3}", v, p.x, p.y);
//! }
//! ```
//!
//! # References
//!
//! - Lévy, B., Petitjean, S., Ray, N., & Maillot, J. (2002). "Least squares
//!   conformal maps for automatic texture atlas generation." ACM SIGGRAPH.

mod island;
mod lscm;
mod method;
mod pins;
mod plane;
mod sparse;
mod uv;

pub use island::UVMesh;
pub use lscm::{lscm, unwrap, LscmOptions, LARGE_MESH_LIMIT};
pub use method::{UnwrapMethod, Unwrapper};
pub use pins::{resolve_pin, resolve_pins, CollisionPolicy, Pin, PinFeature, PinOptions, ResolvedPins};
pub use plane::{PlaneAxes, PlaneProjection};
pub use uv::UVMap;

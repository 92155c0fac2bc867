//! Unwrapping and packing algorithms.
//!
//! - [`seam`]: turning per-face tessellations into one seam-consistent mesh
//! - [`parameterize`]: LSCM and planar unwraps, pins and UV islands
//! - [`boundary`]: seam polylines in UV space
//! - [`pack`]: placing islands in a texture

pub mod boundary;
pub mod pack;
pub mod parameterize;
pub mod progress;
pub mod seam;

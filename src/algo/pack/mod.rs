//! Texture packing.
//!
//! Islands are packed by their bounding boxes. [`Texture`] places single
//! rectangles against the texture border and against each other,
//! [`pack_islands`] drives it over a set of islands and shrinks the scale
//! until everything fits. [`pack_single`] and [`manual_layout`] cover the
//! cases where no search is needed.
//!
//! The result is a [`Layout`]: one [`LayoutTransform`] per island, applied
//! to the island's area-normalised UVs (or to the raw UVs for manual
//! layouts) to get texture coordinates.

mod layout;
mod multi;
mod node;
mod single;

pub use layout::{IslandBounds, Layout, LayoutTransform};
pub use multi::{pack_islands, pack_islands_with_progress, pack_meshes, PackOptions, Packing};
pub use node::{Align, Axis, NodeId, PackingNode, Placement, Texture};
pub use single::{manual_layout, pack_single};

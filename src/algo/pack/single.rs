//! Layouts that need no placement search: one island filling the texture,
//! and layouts supplied by the caller.

use std::collections::HashSet;

use crate::algo::parameterize::UVMesh;
use crate::error::{Result, UnwrapError};

use super::layout::{IslandBounds, Layout, LayoutTransform};
use super::multi::PackOptions;

/// Scale one island to fill the texture, keeping the buffer free.
///
/// The island keeps its aspect ratio, so it fills the texture along one
/// axis only. Offsets are relative to the texture size along each axis.
pub fn pack_single(island: &IslandBounds, options: &PackOptions) -> Result<Layout> {
    options.validate()?;
    if !(island.width() > 0.0 && island.height() > 0.0) {
        return Err(UnwrapError::invalid_param(
            "island",
            &island.id,
            "bounds must have positive width and height",
        ));
    }

    let (w, h) = options.resolution;
    let b = options.buffer;
    let scale = ((w - b) / w / island.width()).min((h - b) / h / island.height());
    let transform = LayoutTransform::new(
        b / w - island.min.x * scale,
        b / h - island.min.y * scale,
        scale,
    );
    Ok(Layout::new(vec![(island.id.clone(), transform)], true))
}

/// A caller supplied layout for raw UV coordinates.
///
/// # Errors
///
/// [`UnwrapError::InvalidSelection`] when an entry names no island, an
/// island is listed twice, or an island has no entry.
pub fn manual_layout(entries: Vec<(String, LayoutTransform)>, islands: &[UVMesh]) -> Result<Layout> {
    let known: HashSet<&str> = islands.iter().map(UVMesh::id).collect();
    let mut listed = HashSet::new();

    for (id, _) in &entries {
        if !known.contains(id.as_str()) {
            return Err(UnwrapError::InvalidSelection(format!("layout names unknown island {id}")));
        }
        if !listed.insert(id.as_str()) {
            return Err(UnwrapError::InvalidSelection(format!("island {id} is placed twice")));
        }
    }
    if let Some(missing) = islands.iter().find(|island| !listed.contains(island.id())) {
        return Err(UnwrapError::InvalidSelection(format!(
            "no placement for island {}",
            missing.id()
        )));
    }

    Ok(Layout::new(entries, false))
}

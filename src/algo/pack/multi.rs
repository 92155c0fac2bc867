//! Packing many islands into one texture.

use std::collections::HashSet;

use nalgebra::Point2;

use crate::algo::parameterize::UVMesh;
use crate::algo::progress::Progress;
use crate::error::{warn, Result, UnwrapError, Warning};

use super::layout::{IslandBounds, Layout, LayoutTransform};
use super::node::{Align, Texture};

/// Options for [`pack_islands`].
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Texture size in pixels.
    pub resolution: (f64, f64),
    /// Gap in pixels kept around every island and at the texture border.
    pub buffer: f64,
    /// Number of scales tried before giving up.
    pub max_iter: usize,
    /// Factor applied to the scale after a failed attempt.
    pub shrink: f64,
    pub align: Align,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            resolution: (1024.0, 1024.0),
            buffer: 0.0,
            max_iter: 100,
            shrink: 0.95,
            align: Align::BottomLeft,
        }
    }
}

impl PackOptions {
    pub fn with_resolution(mut self, width: f64, height: f64) -> Self {
        self.resolution = (width, height);
        self
    }

    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_shrink(mut self, shrink: f64) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let (w, h) = self.resolution;
        if !(w > 0.0 && w.is_finite()) {
            return Err(UnwrapError::invalid_param("resolution", w, "width must be positive"));
        }
        if !(h > 0.0 && h.is_finite()) {
            return Err(UnwrapError::invalid_param("resolution", h, "height must be positive"));
        }
        if !(self.buffer >= 0.0) || 2.0 * self.buffer >= w.min(h) {
            return Err(UnwrapError::invalid_param(
                "buffer",
                self.buffer,
                "must be non-negative and leave room inside the texture",
            ));
        }
        if self.max_iter == 0 {
            return Err(UnwrapError::invalid_param("max_iter", self.max_iter, "must be at least 1"));
        }
        if !(self.shrink > 0.0 && self.shrink < 1.0) {
            return Err(UnwrapError::invalid_param("shrink", self.shrink, "must be in (0, 1)"));
        }
        Ok(())
    }
}

/// Result of [`pack_islands`].
#[derive(Debug, Clone)]
pub struct Packing {
    /// Island placements in normalised texture units, in input order.
    pub layout: Layout,
    /// Pixels per normalised UV unit.
    pub scale: f64,
    /// Number of attempts, including the successful one.
    pub attempts: usize,
    /// Placed rectangles in pixels, in input order.
    pub rects: Vec<IslandBounds>,
}

/// Pack islands given by their bounds into one texture.
///
/// Islands are placed one at a time, largest first, each at the free spot
/// closest to the alignment corner. When an island does not fit, the scale
/// is reduced and packing restarts. An island id listed twice is reported
/// as [`Warning::RepeatedFeature`] and packed once.
///
/// # Errors
///
/// - [`UnwrapError::InvalidParameter`] for bad options or an island with
///   zero width or height.
/// - [`UnwrapError::InvalidSelection`] when there is nothing to pack.
/// - [`UnwrapError::PackingFailed`] when no scale within `max_iter`
///   attempts fits every island.
///
/// # Example
///
/// ```
/// use unfurl::algo::pack::{pack_islands, IslandBounds, PackOptions};
/// use nalgebra::Point2;
///
/// let islands: Vec<IslandBounds> = ["A", "B", "C"]
///     .iter()
///     .map(|id| IslandBounds::new(*id, Point2::origin(), Point2::new(1.0, 1.0)))
///     .collect();
/// let packing = pack_islands(&islands, &PackOptions::default().with_resolution(3.0, 1.0)).unwrap();
/// assert_eq!(packing.scale, 1.0);
/// assert_eq!(packing.layout.len(), 3);
/// ```
pub fn pack_islands(islands: &[IslandBounds], options: &PackOptions) -> Result<Packing> {
    pack_islands_with_progress(islands, options, &Progress::none())
}

/// [`pack_islands`] reporting every attempt to `progress`.
pub fn pack_islands_with_progress(
    islands: &[IslandBounds],
    options: &PackOptions,
    progress: &Progress,
) -> Result<Packing> {
    options.validate()?;
    if islands.is_empty() {
        return Err(UnwrapError::InvalidSelection("no islands to pack".into()));
    }
    if let Some(island) = islands.iter().find(|b| !(b.width() > 0.0 && b.height() > 0.0)) {
        return Err(UnwrapError::invalid_param(
            "island",
            &island.id,
            "bounds must have positive width and height",
        ));
    }

    let mut seen = HashSet::new();
    let islands: Vec<&IslandBounds> = islands
        .iter()
        .filter(|island| {
            let fresh = seen.insert(island.id.as_str());
            if !fresh {
                warn(&Warning::RepeatedFeature(island.id.clone()));
            }
            fresh
        })
        .collect();

    let (w, h) = options.resolution;
    let area: f64 = islands.iter().map(|b| b.area()).sum();
    let max_w = islands.iter().map(|b| b.width()).fold(0.0, f64::max);
    let max_h = islands.iter().map(|b| b.height()).fold(0.0, f64::max);
    let mut scale = (w * h / area).sqrt().min(w / max_w).min(h / max_h);

    // Largest first; the sort is stable so equal areas keep input order.
    let mut order: Vec<usize> = (0..islands.len()).collect();
    order.sort_by(|&a, &b| islands[b].area().total_cmp(&islands[a].area()));

    for attempt in 1..=options.max_iter {
        progress.report(attempt - 1, options.max_iter, "Packing islands");

        if let Some(texture) = try_pack(&islands, &order, scale, options) {
            log::info!(
                "packed {} islands at scale {:.4} after {} attempts",
                islands.len(),
                scale,
                attempt
            );
            return Ok(finish(&islands, &order, &texture, scale, attempt, options));
        }
        log::debug!("packing attempt {} failed at scale {:.4}", attempt, scale);
        scale *= options.shrink;
    }

    Err(UnwrapError::PackingFailed {
        iterations: options.max_iter,
    })
}

/// Pack unwrapped meshes by their normalised bounds.
///
/// # Errors
///
/// [`UnwrapError::InvalidSelection`] if an island is not unwrapped, plus
/// everything [`pack_islands`] reports.
pub fn pack_meshes(islands: &[UVMesh], options: &PackOptions) -> Result<Packing> {
    let bounds = islands
        .iter()
        .map(|island| {
            island.island_bounds().ok_or_else(|| {
                UnwrapError::InvalidSelection(format!("island {} is not unwrapped", island.id()))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    pack_islands(&bounds, options)
}

fn try_pack(islands: &[&IslandBounds], order: &[usize], scale: f64, options: &PackOptions) -> Option<Texture> {
    let (w, h) = options.resolution;
    let mut texture = Texture::new(w, h, options.buffer);
    for &i in order {
        let size = (islands[i].width(), islands[i].height());
        texture.place(size, scale, options.align)?;
    }
    Some(texture)
}

fn finish(
    islands: &[&IslandBounds],
    order: &[usize],
    texture: &Texture,
    scale: f64,
    attempts: usize,
    options: &PackOptions,
) -> Packing {
    let rescale = 1.0 / options.resolution.0.max(options.resolution.1);

    let mut placed: Vec<Option<IslandBounds>> = vec![None; islands.len()];
    for (&i, node) in order.iter().zip(texture.placed()) {
        placed[i] = Some(IslandBounds::new(
            islands[i].id.clone(),
            Point2::new(node.left, node.bottom),
            Point2::new(node.right, node.top),
        ));
    }
    let rects: Vec<IslandBounds> = placed.into_iter().flatten().collect();

    let entries = islands
        .iter()
        .zip(&rects)
        .map(|(island, rect)| {
            let transform = LayoutTransform::new(
                (rect.min.x - island.min.x * scale) * rescale,
                (rect.min.y - island.min.y * scale) * rescale,
                scale * rescale,
            );
            (island.id.clone(), transform)
        })
        .collect();

    Packing {
        layout: Layout::new(entries, true),
        scale,
        attempts,
        rects,
    }
}

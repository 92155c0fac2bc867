//! Rectangle placement against a texture and already placed rectangles.
//!
//! Coordinates have their origin in the bottom left corner, x to the right
//! and y upwards. Every node is anchored to two other nodes: one it sits
//! beside horizontally and one it sits on (or under) vertically. The
//! texture itself is the first node, with its bounds inverted so that
//! aligning against it lands on the inside of the texture.

use std::fmt;
use std::str::FromStr;

use crate::error::UnwrapError;

/// Tolerance for the texture containment test.
const CONTAINMENT_EPSILON: f64 = 1e-9;

/// Two candidate positions closer than this are the same placement.
const DEDUP_EPSILON: f64 = 1e-5;

/// The corner a rectangle is aligned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl Align {
    /// True when aligning by the right hand side.
    pub fn right(self) -> bool {
        matches!(self, Self::BottomRight | Self::TopRight)
    }

    /// True when aligning by the top.
    pub fn top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    fn dir(self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.right(),
            Axis::Vertical => self.top(),
        }
    }
}

impl FromStr for Align {
    type Err = UnwrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bl" => Ok(Self::BottomLeft),
            "br" => Ok(Self::BottomRight),
            "tl" => Ok(Self::TopLeft),
            "tr" => Ok(Self::TopRight),
            _ => Err(UnwrapError::invalid_param(
                "align",
                s,
                "expected one of bl, br, tl, tr",
            )),
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BottomLeft => "bl",
            Self::BottomRight => "br",
            Self::TopLeft => "tl",
            Self::TopRight => "tr",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Handle to a node of a [`Texture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The texture boundary.
    pub const TEXTURE: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A rectangle of `size * scale` in a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingNode {
    pub size: (f64, f64),
    pub scale: f64,
    pub align: Align,
    /// Gap kept to the bounds of this node.
    pub buffer: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    hori: Option<NodeId>,
    vert: Option<NodeId>,
}

impl PackingNode {
    /// An unplaced node with its bottom left corner at the origin.
    pub fn new(size: (f64, f64), scale: f64, align: Align) -> Self {
        let mut node = Self {
            size,
            scale,
            align,
            buffer: 0.0,
            left: 0.0,
            right: 0.0,
            bottom: 0.0,
            top: 0.0,
            hori: None,
            vert: None,
        };
        node.set_bound(Axis::Horizontal, false, 0.0);
        node.set_bound(Axis::Vertical, false, 0.0);
        node
    }

    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn width(&self) -> f64 {
        self.size.0 * self.scale
    }

    pub fn height(&self) -> f64 {
        self.size.1 * self.scale
    }

    /// The node this one is aligned beside.
    pub fn hori(&self) -> Option<NodeId> {
        self.hori
    }

    /// The node this one is aligned on or under.
    pub fn vert(&self) -> Option<NodeId> {
        self.vert
    }

    /// Position a node aligning with direction `dir` must take to sit
    /// against this one, buffer included.
    ///
    /// Aligning by the left (`dir == false`) puts the node against this
    /// node's right side; aligning by the right puts it against the left
    /// side. The vertical axis works the same way.
    pub fn get_bound(&self, axis: Axis, dir: bool) -> f64 {
        match (axis, dir) {
            (Axis::Horizontal, false) => self.right + self.buffer,
            (Axis::Horizontal, true) => self.left - self.buffer,
            (Axis::Vertical, false) => self.top + self.buffer,
            (Axis::Vertical, true) => self.bottom - self.buffer,
        }
    }

    /// Move the node so its `dir` side along `axis` is at `value`.
    pub fn set_bound(&mut self, axis: Axis, dir: bool, value: f64) {
        match (axis, dir) {
            (Axis::Horizontal, false) => {
                self.left = value;
                self.right = value + self.width();
            }
            (Axis::Horizontal, true) => {
                self.right = value;
                self.left = value - self.width();
            }
            (Axis::Vertical, false) => {
                self.bottom = value;
                self.top = value + self.height();
            }
            (Axis::Vertical, true) => {
                self.top = value;
                self.bottom = value - self.height();
            }
        }
    }

    /// Open interval overlap with `other` along `axis`, with `other`
    /// grown by its buffer.
    pub fn overlaps(&self, other: &PackingNode, axis: Axis) -> bool {
        let b = other.buffer;
        match axis {
            Axis::Horizontal => self.left < other.right + b && self.right > other.left - b,
            Axis::Vertical => self.bottom < other.top + b && self.top > other.bottom - b,
        }
    }

    pub fn collides(&self, other: &PackingNode) -> bool {
        self.overlaps(other, Axis::Horizontal) && self.overlaps(other, Axis::Vertical)
    }
}

/// A candidate position for a new node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub hori: NodeId,
    pub vert: NodeId,
    /// Horizontal bound on the alignment side.
    pub x: f64,
    /// Vertical bound on the alignment side.
    pub y: f64,
}

/// A bounded texture and the nodes placed in it.
///
/// # Example
///
/// ```
/// use unfurl::algo::pack::{Align, Texture};
///
/// let mut texture = Texture::new(3.0, 1.0, 0.0);
/// for _ in 0..3 {
///     texture.place((1.0, 1.0), 1.0, Align::BottomLeft).unwrap();
/// }
/// let lefts: Vec<f64> = texture.placed().map(|n| n.left).collect();
/// assert_eq!(lefts, vec![0.0, 1.0, 2.0]);
/// assert!(texture.place((1.0, 1.0), 1.0, Align::BottomLeft).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Texture {
    width: f64,
    height: f64,
    buffer: f64,
    nodes: Vec<PackingNode>,
}

impl Texture {
    pub fn new(width: f64, height: f64, buffer: f64) -> Self {
        let root = PackingNode {
            size: (width, height),
            scale: 1.0,
            align: Align::BottomLeft,
            buffer,
            // Inverted, so nodes aligned against the texture end up inside.
            left: width,
            right: 0.0,
            bottom: height,
            top: 0.0,
            hori: None,
            vert: None,
        };
        Self {
            width,
            height,
            buffer,
            nodes: vec![root],
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    pub fn node(&self, id: NodeId) -> &PackingNode {
        &self.nodes[id.0]
    }

    /// Placed nodes in placement order, without the texture itself.
    pub fn placed(&self) -> impl Iterator<Item = &PackingNode> {
        self.nodes[1..].iter()
    }

    pub fn num_placed(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Remove all placed nodes.
    pub fn reset(&mut self) {
        self.nodes.truncate(1);
    }

    /// All distinct positions where a `size * scale` rectangle fits,
    /// aligned against existing nodes.
    pub fn get_placements(&self, size: (f64, f64), scale: f64, align: Align) -> Vec<Placement> {
        let x_dir = align.dir(Axis::Horizontal);
        let y_dir = align.dir(Axis::Vertical);
        let mut test = PackingNode::new(size, scale, align);
        let mut placements: Vec<Placement> = Vec::new();

        for (vi, y_node) in self.nodes.iter().enumerate() {
            let y = y_node.get_bound(Axis::Vertical, y_dir);
            test.set_bound(Axis::Vertical, y_dir, y);

            for (hi, x_node) in self.nodes.iter().enumerate() {
                if !self.beside(&test, hi, Axis::Vertical) {
                    continue;
                }
                let x = x_node.get_bound(Axis::Horizontal, x_dir);
                test.set_bound(Axis::Horizontal, x_dir, x);

                if !self.contains(&test) || self.placed().any(|node| test.collides(node)) {
                    continue;
                }
                let repeated = placements
                    .iter()
                    .any(|p| (p.x - x).abs() < DEDUP_EPSILON && (p.y - y).abs() < DEDUP_EPSILON);
                if repeated {
                    continue;
                }
                placements.push(Placement {
                    hori: NodeId(hi),
                    vert: NodeId(vi),
                    x,
                    y,
                });
            }
        }
        placements
    }

    /// The placement closest to the alignment corner of the texture.
    ///
    /// Distance is measured from the corner `align` names, not from the
    /// origin. Both agree for [`Align::BottomLeft`]; for the other corners a
    /// right or top aligned layout fills in from its own corner. Ties keep
    /// the first candidate found.
    pub fn get_placement(&self, size: (f64, f64), scale: f64, align: Align) -> Option<Placement> {
        let corner_x = if align.right() { self.width } else { 0.0 };
        let corner_y = if align.top() { self.height } else { 0.0 };
        let distance = |p: &Placement| (p.x - corner_x).hypot(p.y - corner_y);

        self.get_placements(size, scale, align)
            .into_iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
    }

    /// Place a rectangle at its best position.
    ///
    /// Returns `None` when it fits nowhere.
    pub fn place(&mut self, size: (f64, f64), scale: f64, align: Align) -> Option<NodeId> {
        let placement = self.get_placement(size, scale, align)?;
        let mut node = PackingNode::new(size, scale, align).with_buffer(self.buffer);
        node.set_bound(Axis::Horizontal, align.right(), placement.x);
        node.set_bound(Axis::Vertical, align.top(), placement.y);
        node.hori = Some(placement.hori);
        node.vert = Some(placement.vert);

        self.nodes.push(node);
        Some(NodeId(self.nodes.len() - 1))
    }

    /// Whether `node` shares a band along `axis` with node `index`, so it
    /// can be aligned beside it along the other axis.
    fn beside(&self, node: &PackingNode, index: usize, axis: Axis) -> bool {
        if index == 0 {
            return match axis {
                Axis::Horizontal => node.left < self.width && node.right > 0.0,
                Axis::Vertical => node.bottom < self.height && node.top > 0.0,
            };
        }
        let other = &self.nodes[index];
        match axis {
            Axis::Horizontal => node.left < other.right && node.right > other.left,
            Axis::Vertical => node.bottom < other.top && node.top > other.bottom,
        }
    }

    /// Whether `node` lies inside the texture minus its buffer.
    fn contains(&self, node: &PackingNode) -> bool {
        let b = self.buffer - CONTAINMENT_EPSILON;
        node.left >= b
            && node.bottom >= b
            && node.right <= self.width - b
            && node.top <= self.height - b
    }
}

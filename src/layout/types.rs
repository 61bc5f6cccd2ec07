use serde::Serialize;

use super::point_to_polar;
use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Radial,
    Horizontal,
}

impl Orientation {
    /// Layout `(x, y)` for a cartesian point: `(angle, radius)` when radial,
    /// `(vertical slot, depth offset)` when horizontal.
    pub fn coordinates(self, point: (f32, f32)) -> (f32, f32) {
        match self {
            Self::Radial => point_to_polar(point),
            Self::Horizontal => (point.1, point.0),
        }
    }
}

/// A node placed by one layout pass. Rebuilt on every pass, never stored in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub key: NodeId,
    pub name: String,
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Radial: angle in radians. Horizontal: vertical slot.
    pub x: f32,
    /// Radial: distance from the centre. Horizontal: offset from the left.
    pub y: f32,
    /// Cartesian position relative to the layout origin.
    pub point: (f32, f32),
    pub progress: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub source: PositionedNode,
    pub target: PositionedNode,
}

impl PositionedNode {
    /// Places the node at `point` and re-derives its own `x`/`y` from it.
    pub fn relocate(&mut self, orientation: Orientation, point: (f32, f32)) {
        let (x, y) = orientation.coordinates(point);
        self.point = point;
        self.x = x;
        self.y = y;
    }
}

impl Link {
    /// Links are keyed by their target, which has exactly one parent.
    pub fn key(&self) -> NodeId {
        self.target.key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    /// Pre-order.
    pub descendants: Vec<PositionedNode>,
    pub links: Vec<Link>,
    pub orientation: Orientation,
    /// Where the layout's `(0, 0)` sits in the viewport.
    pub origin: (f32, f32),
    /// Breadth and depth extents the layout was fitted into.
    pub extent: (f32, f32),
}

impl TreeLayout {
    pub fn node(&self, key: NodeId) -> Option<&PositionedNode> {
        self.descendants.iter().find(|node| node.key == key)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&PositionedNode> {
        self.descendants.iter().find(|node| node.name == name)
    }

    /// Overrides one node's cartesian position (drag), keeping links in sync.
    pub fn move_node(&mut self, key: NodeId, point: (f32, f32)) -> Option<&PositionedNode> {
        let orientation = self.orientation;
        for link in &mut self.links {
            if link.source.key == key {
                link.source.relocate(orientation, point);
            }
            if link.target.key == key {
                link.target.relocate(orientation, point);
            }
        }
        let node = self.descendants.iter_mut().find(|node| node.key == key)?;
        node.relocate(orientation, point);
        Some(node)
    }
}

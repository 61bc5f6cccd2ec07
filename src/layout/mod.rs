mod horizontal;
mod radial;
pub(crate) mod tidy;
pub(crate) mod types;
pub use types::*;
use horizontal::*;
use radial::*;
pub(crate) use radial::{point_to_polar, polar_to_point};

use crate::config::{HorizontalConfig, LayoutConfig, RadialConfig};
use crate::error::{MindMapError, Result};
use crate::tree::{Node, NodeId};
use std::fmt;
use tidy::{Separation, TidySlot, tidy_tree};

/// Converts a tree into positioned nodes and links for a viewport.
///
/// Implementations must be pure: the same tree and viewport give the same output.
/// The default body marks the operation as missing.
pub trait LayoutEngine {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn compute_layout(&self, root: &Node, width: f32, height: f32) -> Result<TreeLayout> {
        let _ = (root, width, height);
        Err(MindMapError::NotImplemented("LayoutEngine::compute_layout"))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadialLayout {
    pub config: RadialConfig,
}

impl RadialLayout {
    pub fn new(config: RadialConfig) -> Self {
        Self { config }
    }
}

impl LayoutEngine for RadialLayout {
    fn name(&self) -> &'static str {
        "radial"
    }

    fn compute_layout(&self, root: &Node, width: f32, height: f32) -> Result<TreeLayout> {
        Ok(compute_radial_layout(root, width, height, &self.config))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorizontalLayout {
    pub config: HorizontalConfig,
}

impl HorizontalLayout {
    pub fn new(config: HorizontalConfig) -> Self {
        Self { config }
    }
}

impl LayoutEngine for HorizontalLayout {
    fn name(&self) -> &'static str {
        "horizontal"
    }

    fn compute_layout(&self, root: &Node, width: f32, height: f32) -> Result<TreeLayout> {
        Ok(compute_horizontal_layout(root, width, height, &self.config))
    }
}

/// Layout variant selected at construction time.
pub enum LayoutStrategy {
    Radial(RadialLayout),
    Horizontal(HorizontalLayout),
    Custom(Box<dyn LayoutEngine>),
}

impl LayoutStrategy {
    pub fn radial() -> Self {
        Self::Radial(RadialLayout::default())
    }

    pub fn horizontal() -> Self {
        Self::Horizontal(HorizontalLayout::default())
    }

    pub fn from_name(name: &str, config: &LayoutConfig) -> Option<Self> {
        match name {
            "radial" => Some(Self::Radial(RadialLayout::new(config.radial.clone()))),
            "horizontal" | "tree" => Some(Self::Horizontal(HorizontalLayout::new(
                config.horizontal.clone(),
            ))),
            _ => None,
        }
    }
}

impl Default for LayoutStrategy {
    fn default() -> Self {
        Self::radial()
    }
}

impl fmt::Debug for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radial(layout) => f.debug_tuple("Radial").field(layout).finish(),
            Self::Horizontal(layout) => f.debug_tuple("Horizontal").field(layout).finish(),
            Self::Custom(engine) => f.debug_tuple("Custom").field(&engine.name()).finish(),
        }
    }
}

impl LayoutEngine for LayoutStrategy {
    fn name(&self) -> &'static str {
        match self {
            Self::Radial(layout) => layout.name(),
            Self::Horizontal(layout) => layout.name(),
            Self::Custom(engine) => engine.name(),
        }
    }

    fn compute_layout(&self, root: &Node, width: f32, height: f32) -> Result<TreeLayout> {
        match self {
            Self::Radial(layout) => layout.compute_layout(root, width, height),
            Self::Horizontal(layout) => layout.compute_layout(root, width, height),
            Self::Custom(engine) => engine.compute_layout(root, width, height),
        }
    }
}

fn preorder(root: &Node) -> Vec<&Node> {
    let mut out = Vec::with_capacity(root.count());
    root.walk(&mut |node| out.push(node));
    out
}

/// Zips tidy slots with their nodes and derives the parent-to-child links.
///
/// `project` maps a slot to `(x, y, point)` in the variant's coordinate system.
fn assemble(
    root: &Node,
    slots: &[TidySlot],
    project: impl Fn(&TidySlot) -> (f32, f32, (f32, f32)),
) -> (Vec<PositionedNode>, Vec<Link>) {
    let nodes = preorder(root);
    let keys: Vec<NodeId> = nodes.iter().map(|node| node.id).collect();
    let descendants: Vec<PositionedNode> = nodes
        .iter()
        .zip(slots)
        .map(|(node, slot)| {
            let (x, y, point) = project(slot);
            PositionedNode {
                key: node.id,
                name: node.name.clone(),
                depth: slot.depth,
                parent: slot.parent.map(|idx| keys[idx]),
                x,
                y,
                point,
                progress: node.progress.unwrap_or(0),
            }
        })
        .collect();
    let links = slots
        .iter()
        .enumerate()
        .filter_map(|(idx, slot)| {
            let parent = slot.parent?;
            Some(Link {
                source: descendants[parent].clone(),
                target: descendants[idx].clone(),
            })
        })
        .collect();
    (descendants, links)
}

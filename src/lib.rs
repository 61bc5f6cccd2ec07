#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod layout;
pub mod layout_dump;
pub mod mindmap;
pub mod panel;
pub mod render;
pub mod scene;
pub mod theme;
pub mod tree;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, ZoomConfig, load_config, parse_config};
pub use error::{MindMapError, Result};
pub use events::{EventBus, EventKind, MindMapEvent};
pub use layout::{
    HorizontalLayout, LayoutEngine, LayoutStrategy, Link, Orientation, PositionedNode,
    RadialLayout, TreeLayout,
};
pub use mindmap::{MindMap, MindMapFactory, MindMapOptions};
pub use panel::SidePanel;
pub use render::{PointerEvent, PointerOutcome, Renderer, StyleDecorator, SvgRenderer, scene_to_svg};
pub use scene::Scene;
pub use theme::{StyleConfig, Theme};
pub use tree::{Node, NodeId, NodeSpec, Summary, TreeModel, load_tree, parse_tree};
pub use view::ViewTransform;

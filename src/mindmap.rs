use std::collections::HashSet;
use std::fmt;

use crate::config::Config;
use crate::error::{MindMapError, Result};
use crate::events::{EventBus, EventKind, MindMapEvent};
use crate::layout::{LayoutEngine, LayoutStrategy, Orientation, RadialLayout, TreeLayout};
use crate::panel::SidePanel;
use crate::render::{PointerEvent, PointerOutcome, Renderer, StyleDecorator, SvgRenderer, scene_to_svg};
use crate::scene::Scene;
use crate::theme::StyleConfig;
use crate::tree::{Node, NodeId, NodeSpec, TreeModel};
use crate::view::{ViewState, ViewTransform};

/// Construction options, mirroring what a host page passes in.
pub struct MindMapOptions {
    pub viewport_selector: String,
    pub width: f32,
    pub height: f32,
    pub style_config: Option<StyleConfig>,
    pub data: Option<Node>,
    pub layout_strategy: Option<LayoutStrategy>,
    pub renderer: Option<Box<dyn Renderer>>,
    pub config: Config,
}

impl MindMapOptions {
    pub fn new(viewport_selector: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            viewport_selector: viewport_selector.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Node) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style_config = Some(style);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

impl Default for MindMapOptions {
    fn default() -> Self {
        let config = Config::default();
        Self {
            viewport_selector: "svg".to_string(),
            width: config.render.width,
            height: config.render.height,
            style_config: None,
            data: None,
            layout_strategy: None,
            renderer: None,
            config,
        }
    }
}

/// Composes tree, layout, renderer and event bus, and owns view state.
pub struct MindMap {
    tree: TreeModel,
    layout_strategy: LayoutStrategy,
    renderer: Box<dyn Renderer>,
    events: EventBus,
    view: ViewState,
    scene: Scene,
    frame: TreeLayout,
    config: Config,
    selection: Option<NodeId>,
    panel: Option<SidePanel>,
    pan: Option<(f32, f32)>,
    dispatching: bool,
}

impl MindMap {
    pub fn new(options: MindMapOptions) -> Result<Self> {
        let MindMapOptions {
            viewport_selector,
            width,
            height,
            style_config,
            data,
            layout_strategy,
            renderer,
            mut config,
        } = options;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(MindMapError::InvalidViewport { width, height });
        }
        config.zoom = config.zoom.normalized().ok_or(MindMapError::InvalidZoom {
            min_scale: config.zoom.min_scale,
            max_scale: config.zoom.max_scale,
            wheel_step: config.zoom.wheel_step,
        })?;
        config.render.width = width;
        config.render.height = height;

        let layout_strategy = layout_strategy.unwrap_or_else(|| {
            LayoutStrategy::Radial(RadialLayout::new(config.layout.radial.clone()))
        });
        let mut renderer =
            renderer.unwrap_or_else(|| Box::new(SvgRenderer::new(config.render.clone())));
        if let Some(style) = style_config.filter(|style| !style.is_empty()) {
            renderer = Box::new(StyleDecorator::new(renderer, style));
        }

        let tree = TreeModel::new(data.unwrap_or_else(|| Node::new("Root")));
        let scene = Scene::new(viewport_selector, width, height);
        let frame = TreeLayout {
            descendants: Vec::new(),
            links: Vec::new(),
            orientation: Orientation::Radial,
            origin: scene.origin,
            extent: (0.0, 0.0),
        };
        let mut map = Self {
            tree,
            layout_strategy,
            renderer,
            events: EventBus::new(),
            view: ViewState::default(),
            scene,
            frame,
            config,
            selection: None,
            panel: None,
            pan: None,
            dispatching: false,
        };
        map.update()?;
        Ok(map)
    }

    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&MindMapEvent) + 'static) {
        self.events.on(kind, listener);
    }

    /// Subscribes by event name (`"updated"`, `"zoom"`, `"nodeClick"`, `"nodeDoubleClick"`).
    pub fn on_named(
        &mut self,
        name: &str,
        listener: impl FnMut(&MindMapEvent) + 'static,
    ) -> Result<()> {
        let kind = name.parse::<EventKind>()?;
        self.events.on(kind, listener);
        Ok(())
    }

    /// Adds a child under the first node named `parent_name`.
    ///
    /// An unknown parent or a clashing name is logged and leaves the tree
    /// untouched (`Ok(None)`); only layout/render contract failures return `Err`.
    pub fn add_node(
        &mut self,
        parent_name: &str,
        node_or_name: impl Into<NodeSpec>,
    ) -> Result<Option<NodeId>> {
        match self.tree.add_node(parent_name, node_or_name) {
            Ok(id) => {
                self.update()?;
                Ok(Some(id))
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(parent = parent_name, error = %err, "add_node ignored");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Promotes the first node named `name` to root, pushing the current view onto history.
    pub fn set_new_root(&mut self, name: &str) -> Result<bool> {
        let Some(subtree) = self.tree.subtree(name) else {
            let err = MindMapError::NodeNotFound(name.to_string());
            tracing::warn!(error = %err, "set_new_root ignored");
            return Ok(false);
        };
        self.reroot(subtree)?;
        Ok(true)
    }

    fn reroot(&mut self, subtree: Node) -> Result<()> {
        let name = subtree.name.clone();
        self.view.push(self.tree.snapshot());
        self.tree.replace_root(subtree);
        self.selection = None;
        self.panel = None;
        tracing::info!(root = %name, depth = self.view.history.len(), "re-rooted mind map");
        self.update()
    }

    /// Restores the previous root and transform. `Ok(false)` when there is no history.
    pub fn go_back(&mut self) -> Result<bool> {
        let Some(snapshot) = self.view.pop() else {
            return Ok(false);
        };
        self.tree.replace_root(snapshot);
        self.selection = None;
        self.panel = None;
        tracing::info!(
            root = %self.tree.root().name,
            depth = self.view.history.len(),
            "navigated back"
        );
        self.update()?;
        Ok(true)
    }

    /// Full layout pass followed by a keyed render; drag overrides are discarded.
    pub fn update(&mut self) -> Result<()> {
        let frame = self.layout_strategy.compute_layout(
            self.tree.root(),
            self.scene.width,
            self.scene.height,
        )?;
        self.scene.origin = frame.origin;
        self.scene.orientation = frame.orientation;
        self.scene.transform = self.view.transform;
        self.renderer
            .render_links(&mut self.scene, &frame.links, &self.config.theme)?;
        self.renderer
            .render_nodes(&mut self.scene, &frame.descendants, &self.config.theme)?;
        tracing::debug!(
            layout = self.layout_strategy.name(),
            nodes = frame.descendants.len(),
            links = frame.links.len(),
            "mind map updated"
        );
        self.frame = frame;
        self.refresh_highlight();
        self.emit_updated();
        self.dispatch()
    }

    pub fn handle_pointer(&mut self, pointer: PointerEvent) -> Result<PointerOutcome> {
        let outcome = match pointer {
            PointerEvent::Wheel { x, y, delta } => {
                let factor = 2f32.powf(-delta / self.config.zoom.wheel_step);
                self.zoom_by(factor, x, y)?;
                return Ok(PointerOutcome::Ignored);
            }
            PointerEvent::Move { x, y } if self.pan.is_some() => {
                if let Some((last_x, last_y)) = self.pan.replace((x, y)) {
                    self.pan_by(x - last_x, y - last_y)?;
                }
                return Ok(PointerOutcome::Ignored);
            }
            PointerEvent::Up { .. } if self.pan.is_some() => {
                self.pan = None;
                return Ok(PointerOutcome::Ignored);
            }
            PointerEvent::Down { x, y } => {
                let outcome =
                    self.renderer
                        .handle_pointer(&mut self.scene, pointer, &mut self.events)?;
                if outcome == PointerOutcome::Ignored {
                    self.pan = Some((x, y));
                }
                outcome
            }
            PointerEvent::Leave => {
                self.pan = None;
                self.renderer
                    .handle_pointer(&mut self.scene, pointer, &mut self.events)?
            }
            _ => self
                .renderer
                .handle_pointer(&mut self.scene, pointer, &mut self.events)?,
        };
        if let PointerOutcome::Dragged { key, point } = outcome {
            self.frame.move_node(key, point);
            self.renderer
                .render_links(&mut self.scene, &self.frame.links, &self.config.theme)?;
            self.emit_updated();
        }
        self.dispatch()?;
        Ok(outcome)
    }

    pub fn zoom_by(&mut self, factor: f32, cx: f32, cy: f32) -> Result<()> {
        let transform = self.view.transform.zoomed(factor, cx, cy, &self.config.zoom);
        self.apply_transform(transform)
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) -> Result<()> {
        let transform = self.view.transform.translated(dx, dy);
        self.apply_transform(transform)
    }

    pub fn set_transform(&mut self, transform: ViewTransform) -> Result<()> {
        let scale = transform
            .scale
            .clamp(self.config.zoom.min_scale, self.config.zoom.max_scale);
        self.apply_transform(ViewTransform { scale, ..transform })
    }

    fn apply_transform(&mut self, transform: ViewTransform) -> Result<()> {
        self.view.transform = transform;
        self.scene.transform = transform;
        self.events.emit(MindMapEvent::Zoom(transform));
        self.dispatch()
    }

    /// Programmatic click on the first displayed node named `name`.
    pub fn click_node(&mut self, name: &str) -> Result<bool> {
        let Some(node) = self.frame.node_by_name(name).cloned() else {
            tracing::warn!(error = %MindMapError::NodeNotFound(name.to_string()), "click ignored");
            return Ok(false);
        };
        self.events.emit(MindMapEvent::NodeClick(node));
        self.dispatch()?;
        Ok(true)
    }

    pub fn double_click_node(&mut self, name: &str) -> Result<bool> {
        let Some(node) = self.frame.node_by_name(name).cloned() else {
            tracing::warn!(
                error = %MindMapError::NodeNotFound(name.to_string()),
                "double click ignored"
            );
            return Ok(false);
        };
        self.events.emit(MindMapEvent::NodeDoubleClick(node));
        self.dispatch()?;
        Ok(true)
    }

    /// Re-triggers `nodeClick` for the breadcrumb segment at `index`.
    pub fn click_breadcrumb(&mut self, index: usize) -> Result<bool> {
        let key = self
            .panel
            .as_ref()
            .and_then(|panel| panel.breadcrumb.get(index))
            .map(|segment| segment.key);
        let Some(node) = key.and_then(|key| self.frame.node(key)).cloned() else {
            return Ok(false);
        };
        self.events.emit(MindMapEvent::NodeClick(node));
        self.dispatch()?;
        Ok(true)
    }

    /// Root-to-node names for the first node named `name`.
    pub fn ancestor_path(&self, name: &str) -> Option<Vec<String>> {
        self.tree
            .ancestor_path(name)
            .map(|path| path.iter().map(|node| node.name.clone()).collect())
    }

    pub fn tick(&mut self, dt_ms: f32) {
        self.scene.tick(dt_ms);
    }

    pub fn to_svg(&self) -> String {
        scene_to_svg(&self.scene)
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.frame
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn transform(&self) -> ViewTransform {
        self.view.transform
    }

    pub fn history_len(&self) -> usize {
        self.view.history.len()
    }

    pub fn side_panel(&self) -> Option<&SidePanel> {
        self.panel.as_ref()
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn emit_updated(&mut self) {
        self.events.emit(MindMapEvent::Updated {
            nodes: self.frame.descendants.clone(),
            links: self.frame.links.clone(),
        });
    }

    /// Runs built-in reactions, then subscribers, until the queue is empty.
    /// Re-entrant calls (a reaction that updates) just leave their events queued.
    fn dispatch(&mut self) -> Result<()> {
        if self.dispatching {
            return Ok(());
        }
        self.dispatching = true;
        let result = self.drain_events();
        self.dispatching = false;
        result
    }

    fn drain_events(&mut self) -> Result<()> {
        while self.events.has_pending() {
            for event in self.events.take_pending() {
                self.react(&event)?;
                self.events.notify(&event);
            }
        }
        Ok(())
    }

    fn react(&mut self, event: &MindMapEvent) -> Result<()> {
        match event {
            MindMapEvent::NodeClick(node) => {
                self.select(node.key);
                Ok(())
            }
            MindMapEvent::NodeDoubleClick(node) => match self.tree.find_by_id(node.key).cloned() {
                Some(subtree) => self.reroot(subtree),
                None => Ok(()),
            },
            MindMapEvent::Updated { .. } | MindMapEvent::Zoom(_) => Ok(()),
        }
    }

    fn select(&mut self, key: NodeId) {
        let Some(path) = self.tree.ancestor_path_by_id(key) else {
            return;
        };
        self.panel = SidePanel::for_path(&path);
        self.selection = Some(key);
        self.refresh_highlight();
    }

    fn refresh_highlight(&mut self) {
        let keys: HashSet<NodeId> = self
            .selection
            .and_then(|key| self.tree.ancestor_path_by_id(key))
            .map(|path| path.iter().map(|node| node.id).collect())
            .unwrap_or_default();
        if keys.is_empty() {
            self.selection = None;
        }
        self.scene.set_highlight(&keys);
    }
}

impl fmt::Debug for MindMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindMap")
            .field("root", &self.tree.root().name)
            .field("nodes", &self.tree.len())
            .field("layout", &self.layout_strategy)
            .field("transform", &self.view.transform)
            .field("history", &self.view.history.len())
            .field("selection", &self.selection)
            .field("events", &self.events)
            .finish()
    }
}

/// Preset constructors.
pub struct MindMapFactory;

impl MindMapFactory {
    /// Radial layout with the SVG renderer (style config applied through a decorator).
    pub fn create_radial_mind_map(mut options: MindMapOptions) -> Result<MindMap> {
        let radial = RadialLayout::new(options.config.layout.radial.clone());
        options.layout_strategy = Some(LayoutStrategy::Radial(radial));
        options.renderer = Some(Box::new(SvgRenderer::new(options.config.render.clone())));
        MindMap::new(options)
    }

    pub fn create_custom_mind_map(
        mut options: MindMapOptions,
        layout_strategy: LayoutStrategy,
        renderer: Box<dyn Renderer>,
    ) -> Result<MindMap> {
        options.layout_strategy = Some(layout_strategy);
        options.renderer = Some(renderer);
        MindMap::new(options)
    }
}

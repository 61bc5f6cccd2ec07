use crate::config::RenderConfig;
use crate::error::{MindMapError, Result};
use crate::events::{EventBus, MindMapEvent};
use crate::layout::{Link, Orientation, PositionedNode, point_to_polar, polar_to_point};
use crate::scene::{
    DragSession, LinkStyle, NodeStyle, RenderDiff, Scene, SceneLink, SceneNode, Transition,
};
use crate::theme::{StyleConfig, Theme};
use crate::tree::NodeId;
use std::f32::consts::TAU;
use std::path::Path;

const MIN_NODE_RADIUS: f32 = 15.0;
const MAX_NODE_RADIUS: f32 = 40.0;
const RING_GAP: f32 = 5.0;
const RING_WIDTH: f32 = 4.0;

/// Label-driven node size: twice the character count, clamped to `[15, 40]`.
///
/// Clamping `2 * len` rather than adding `2 * len` to the floor keeps short
/// labels such as `"AB"` at exactly 15 and caps 20-character labels at 40.
pub fn node_radius(name: &str) -> f32 {
    (2.0 * name.chars().count() as f32).clamp(MIN_NODE_RADIUS, MAX_NODE_RADIUS)
}

/// Raw pointer input in viewport (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    Down { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Click { x: f32, y: f32 },
    DoubleClick { x: f32, y: f32 },
    Wheel { x: f32, y: f32, delta: f32 },
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    Ignored,
    Hover(Option<NodeId>),
    DragStarted(NodeId),
    Dragged { key: NodeId, point: (f32, f32) },
    DragEnded(NodeId),
    Clicked(NodeId),
    DoubleClicked(NodeId),
}

/// Draws positioned nodes and links into a retained scene and interprets
/// pointer input on it.
///
/// Every method defaults to `NotImplemented`, so a partial renderer fails on
/// first use instead of drawing nothing.
pub trait Renderer {
    fn render_nodes(
        &mut self,
        scene: &mut Scene,
        nodes: &[PositionedNode],
        theme: &Theme,
    ) -> Result<RenderDiff> {
        let _ = (scene, nodes, theme);
        Err(MindMapError::NotImplemented("Renderer::render_nodes"))
    }

    fn render_links(&mut self, scene: &mut Scene, links: &[Link], theme: &Theme) -> Result<RenderDiff> {
        let _ = (scene, links, theme);
        Err(MindMapError::NotImplemented("Renderer::render_links"))
    }

    fn handle_pointer(
        &mut self,
        scene: &mut Scene,
        pointer: PointerEvent,
        events: &mut EventBus,
    ) -> Result<PointerOutcome> {
        let _ = (scene, pointer, events);
        Err(MindMapError::NotImplemented("Renderer::handle_pointer"))
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render_nodes(
        &mut self,
        scene: &mut Scene,
        nodes: &[PositionedNode],
        theme: &Theme,
    ) -> Result<RenderDiff> {
        (**self).render_nodes(scene, nodes, theme)
    }

    fn render_links(&mut self, scene: &mut Scene, links: &[Link], theme: &Theme) -> Result<RenderDiff> {
        (**self).render_links(scene, links, theme)
    }

    fn handle_pointer(
        &mut self,
        scene: &mut Scene,
        pointer: PointerEvent,
        events: &mut EventBus,
    ) -> Result<PointerOutcome> {
        (**self).handle_pointer(scene, pointer, events)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgRenderer {
    config: RenderConfig,
}

impl SvgRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn node_style(theme: &Theme) -> NodeStyle {
        NodeStyle {
            fill: theme.node_fill.clone(),
            stroke: theme.node_stroke.clone(),
            stroke_width: theme.node_stroke_width,
            text_color: theme.text_color.clone(),
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            highlight_color: theme.highlight_color.clone(),
            progress_color: theme.progress_color.clone(),
            progress_track_color: theme.progress_track_color.clone(),
        }
    }
}

impl Renderer for SvgRenderer {
    fn render_nodes(
        &mut self,
        scene: &mut Scene,
        nodes: &[PositionedNode],
        theme: &Theme,
    ) -> Result<RenderDiff> {
        let style = Self::node_style(theme);
        let show_progress = self.config.progress_ring;
        scene.background = theme.background.clone();
        scene.hover_pulse = self.config.hover_pulse;
        let diff = scene.reconcile_nodes(nodes, self.config.transition_ms, |datum| SceneNode {
            datum: datum.clone(),
            radius: node_radius(&datum.name),
            motion: Transition::still(datum.point),
            style: style.clone(),
            show_progress,
            highlighted: false,
        });
        tracing::debug!(
            entered = diff.entered.len(),
            updated = diff.updated.len(),
            exited = diff.exited.len(),
            "rendered nodes"
        );
        Ok(diff)
    }

    fn render_links(&mut self, scene: &mut Scene, links: &[Link], theme: &Theme) -> Result<RenderDiff> {
        let style = LinkStyle {
            color: theme.link_color.clone(),
            width: theme.link_width,
            highlight_color: theme.highlight_color.clone(),
        };
        let diff = scene.reconcile_links(links, |link| SceneLink {
            datum: link.clone(),
            style: style.clone(),
            highlighted: false,
        });
        Ok(diff)
    }

    fn handle_pointer(
        &mut self,
        scene: &mut Scene,
        pointer: PointerEvent,
        events: &mut EventBus,
    ) -> Result<PointerOutcome> {
        let outcome = match pointer {
            PointerEvent::Down { x, y } => match scene.hit_test((x, y)) {
                Some(key) => {
                    scene.drag = Some(DragSession { key, moved: false });
                    PointerOutcome::DragStarted(key)
                }
                None => PointerOutcome::Ignored,
            },
            PointerEvent::Move { x, y } => {
                if let Some(drag) = scene.drag.as_mut() {
                    drag.moved = true;
                    let key = drag.key;
                    let point = scene.transform.invert((x, y), scene.origin);
                    scene.place_node(key, point);
                    PointerOutcome::Dragged { key, point }
                } else {
                    let hit = scene.hit_test((x, y));
                    scene.hovered = hit;
                    PointerOutcome::Hover(hit)
                }
            }
            PointerEvent::Up { .. } => match scene.drag.take() {
                Some(drag) => {
                    scene.suppress_click = drag.moved;
                    PointerOutcome::DragEnded(drag.key)
                }
                None => PointerOutcome::Ignored,
            },
            PointerEvent::Click { x, y } => {
                if std::mem::take(&mut scene.suppress_click) {
                    PointerOutcome::Ignored
                } else {
                    match scene.hit_test((x, y)).and_then(|key| scene.nodes.get(&key)) {
                        Some(node) => {
                            events.emit(MindMapEvent::NodeClick(node.datum.clone()));
                            PointerOutcome::Clicked(node.datum.key)
                        }
                        None => PointerOutcome::Ignored,
                    }
                }
            }
            PointerEvent::DoubleClick { x, y } => {
                match scene.hit_test((x, y)).and_then(|key| scene.nodes.get(&key)) {
                    Some(node) => {
                        events.emit(MindMapEvent::NodeDoubleClick(node.datum.clone()));
                        PointerOutcome::DoubleClicked(node.datum.key)
                    }
                    None => PointerOutcome::Ignored,
                }
            }
            PointerEvent::Leave => {
                scene.hovered = None;
                PointerOutcome::Hover(None)
            }
            PointerEvent::Wheel { .. } => PointerOutcome::Ignored,
        };
        Ok(outcome)
    }
}

/// Wraps a renderer and layers a caller-supplied style over the theme.
/// Behaviour is entirely the inner renderer's.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDecorator<R> {
    inner: R,
    style: StyleConfig,
}

impl<R: Renderer> StyleDecorator<R> {
    pub fn new(inner: R, style: StyleConfig) -> Self {
        Self { inner, style }
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Renderer> Renderer for StyleDecorator<R> {
    fn render_nodes(
        &mut self,
        scene: &mut Scene,
        nodes: &[PositionedNode],
        theme: &Theme,
    ) -> Result<RenderDiff> {
        self.inner
            .render_nodes(scene, nodes, &theme.with_style(&self.style))
    }

    fn render_links(&mut self, scene: &mut Scene, links: &[Link], theme: &Theme) -> Result<RenderDiff> {
        self.inner
            .render_links(scene, links, &theme.with_style(&self.style))
    }

    fn handle_pointer(
        &mut self,
        scene: &mut Scene,
        pointer: PointerEvent,
        events: &mut EventBus,
    ) -> Result<PointerOutcome> {
        self.inner.handle_pointer(scene, pointer, events)
    }
}

/// Serializes the scene as displayed at its current clock.
pub fn scene_to_svg(scene: &Scene) -> String {
    let mut svg = String::new();
    let width = scene.width;
    let height = scene.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" data-viewport=\"{}\">",
        escape_xml(&scene.viewport)
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&scene.background)
    ));
    svg.push_str(&format!(
        "<g class=\"mindmap\" transform=\"{}\">",
        scene.transform.to_svg(scene.origin)
    ));

    for (key, link) in &scene.links {
        let (source, target) = scene.link_endpoints(link);
        let d = link_path(scene.orientation, source, target, link.datum.target.x);
        let (class, stroke) = if link.highlighted {
            ("link highlighted", escape_xml(&link.style.highlight_color))
        } else {
            ("link", escape_xml(&link.style.color))
        };
        svg.push_str(&format!(
            "<path class=\"{class}\" data-key=\"{}\" d=\"{d}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{:.2}\"/>",
            key.0, link.style.width
        ));
    }

    for (key, node) in &scene.nodes {
        let (x, y) = node.position(scene.clock);
        let radius = scene.drawn_radius(*key).unwrap_or(node.radius);
        let class = if node.highlighted {
            "node highlighted"
        } else {
            "node"
        };
        svg.push_str(&format!(
            "<g class=\"{class}\" data-key=\"{}\" transform=\"translate({x:.2},{y:.2})\">",
            key.0
        ));
        if node.show_progress {
            svg.push_str(&progress_ring_svg(radius, node.datum.progress, &node.style));
        }
        let stroke = escape_xml(if node.highlighted {
            &node.style.highlight_color
        } else {
            &node.style.stroke
        });
        svg.push_str(&format!(
            "<circle r=\"{radius:.2}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"{:.2}\"/>",
            escape_xml(&node.style.fill),
            node.style.stroke_width
        ));
        svg.push_str(&format!(
            "<text dy=\".35em\" x=\"0\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&node.style.font_family),
            node.style.font_size,
            escape_xml(&node.style.text_color),
            escape_xml(&node.datum.name)
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</g></svg>");
    svg
}

/// Cubic link path. Radial links bend along the mid ring, horizontal ones along the mid column.
fn link_path(
    orientation: Orientation,
    source: (f32, f32),
    target: (f32, f32),
    target_angle: f32,
) -> String {
    let (c1, c2) = match orientation {
        Orientation::Radial => {
            let (target_polar_angle, target_radius) = point_to_polar(target);
            let (source_angle, source_radius) = if source.0.hypot(source.1) < f32::EPSILON {
                // The centre has no angle of its own.
                (target_angle, 0.0)
            } else {
                point_to_polar(source)
            };
            let mid = (source_radius + target_radius) / 2.0;
            (
                polar_to_point(source_angle, mid),
                polar_to_point(target_polar_angle, mid),
            )
        }
        Orientation::Horizontal => {
            let mid = (source.0 + target.0) / 2.0;
            ((mid, source.1), (mid, target.1))
        }
    };
    format!(
        "M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        source.0, source.1, c1.0, c1.1, c2.0, c2.1, target.0, target.1
    )
}

/// Track circle plus a clockwise arc from 12 o'clock covering `progress` percent.
fn progress_ring_svg(radius: f32, progress: u8, style: &NodeStyle) -> String {
    let ring = radius + RING_GAP;
    let mut out = format!(
        "<circle class=\"progress-track\" r=\"{ring:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{RING_WIDTH}\"/>",
        escape_xml(&style.progress_track_color)
    );
    match progress {
        0 => {}
        p if p >= 100 => out.push_str(&format!(
            "<circle class=\"progress\" r=\"{ring:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{RING_WIDTH}\"/>",
            escape_xml(&style.progress_color)
        )),
        _ => {
            let sweep = TAU * f32::from(progress) / 100.0;
            let (sx, sy) = polar_to_point(0.0, ring);
            let (ex, ey) = polar_to_point(sweep, ring);
            let large_arc = u8::from(progress > 50);
            out.push_str(&format!(
                "<path class=\"progress\" d=\"M {sx:.2} {sy:.2} A {ring:.2} {ring:.2} 0 {large_arc} 1 {ex:.2} {ey:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{RING_WIDTH}\"/>",
                escape_xml(&style.progress_color)
            ));
        }
    }
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 400.0))
        .ok_or_else(|| anyhow::anyhow!("invalid output size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutEngine, LayoutStrategy};
    use crate::tree::{Node, TreeModel};

    fn rendered_scene() -> (Scene, crate::layout::TreeLayout) {
        let mut tree = TreeModel::new(Node::new("Root"));
        tree.add_node("Root", "A").unwrap();
        tree.add_node("A", "B").unwrap();
        let layout = LayoutStrategy::radial()
            .compute_layout(tree.root(), 800.0, 400.0)
            .unwrap();
        let mut scene = Scene::new("svg", 800.0, 400.0);
        let mut renderer = SvgRenderer::new(RenderConfig::default());
        let theme = Theme::default();
        renderer
            .render_nodes(&mut scene, &layout.descendants, &theme)
            .unwrap();
        renderer.render_links(&mut scene, &layout.links, &theme).unwrap();
        (scene, layout)
    }

    #[test]
    fn radius_follows_label_length() {
        assert_eq!(node_radius("AB"), 15.0);
        assert_eq!(node_radius("abcdefghijklmnopqrst"), 40.0);
        assert_eq!(node_radius("abcdefghijk"), 22.0);
        assert_eq!(node_radius(""), 15.0);
    }

    #[test]
    fn svg_contains_nodes_links_and_rings() {
        let (scene, _) = rendered_scene();
        let svg = scene_to_svg(&scene);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"node\"").count(), 3);
        assert_eq!(svg.matches("class=\"link\"").count(), 2);
        assert!(svg.contains(">Root</text>"));
        assert!(svg.contains("progress-track"));
    }

    #[test]
    fn theme_colors_are_escaped_in_attributes() {
        let (mut scene, _) = rendered_scene();
        scene.background = "url(\"#bg\")".to_string();
        for node in scene.nodes.values_mut() {
            node.style.fill = "a\"b".to_string();
            node.style.stroke = "<red>".to_string();
            node.style.text_color = "x'y".to_string();
            node.style.progress_track_color = "t&t".to_string();
        }
        for link in scene.links.values_mut() {
            link.style.color = "c\"d".to_string();
        }
        let svg = scene_to_svg(&scene);
        assert!(svg.contains("fill=\"url(&quot;#bg&quot;)\""));
        assert!(svg.contains("fill=\"a&quot;b\""));
        assert!(svg.contains("stroke=\"&lt;red&gt;\""));
        assert!(svg.contains("fill=\"x&apos;y\""));
        assert!(svg.contains("stroke=\"t&amp;t\""));
        assert!(svg.contains("stroke=\"c&quot;d\""));
        assert!(!svg.contains("a\"b"));
    }

    #[test]
    fn progress_ring_shapes() {
        let style = SvgRenderer::node_style(&Theme::default());
        assert!(!progress_ring_svg(15.0, 0, &style).contains("class=\"progress\""));
        assert!(progress_ring_svg(15.0, 100, &style).contains("<circle class=\"progress\""));
        let half = progress_ring_svg(15.0, 75, &style);
        assert!(half.contains(" 0 1 1 "));
        let quarter = progress_ring_svg(15.0, 25, &style);
        assert!(quarter.contains(" 0 0 1 "));
    }

    #[test]
    fn decorator_only_changes_style() {
        let mut tree = TreeModel::new(Node::new("Root"));
        tree.add_node("Root", "A").unwrap();
        let layout = LayoutStrategy::radial()
            .compute_layout(tree.root(), 800.0, 400.0)
            .unwrap();
        let theme = Theme::default();
        let style = StyleConfig {
            node_fill: Some("#ffffff".to_string()),
            ..StyleConfig::default()
        };
        let mut plain = Scene::new("svg", 800.0, 400.0);
        let mut decorated = plain.clone();
        let plain_diff = SvgRenderer::default()
            .render_nodes(&mut plain, &layout.descendants, &theme)
            .unwrap();
        let decorated_diff = StyleDecorator::new(SvgRenderer::default(), style)
            .render_nodes(&mut decorated, &layout.descendants, &theme)
            .unwrap();
        assert_eq!(plain_diff, decorated_diff);
        for (key, node) in &decorated.nodes {
            assert_eq!(node.style.fill, "#ffffff");
            assert_eq!(node.motion, plain.nodes[key].motion);
            assert_eq!(node.radius, plain.nodes[key].radius);
        }
    }

    #[test]
    fn pointer_gestures_emit_events() {
        let (mut scene, layout) = rendered_scene();
        let mut renderer = SvgRenderer::new(RenderConfig::default());
        let mut events = EventBus::new();
        let a = layout.node_by_name("A").unwrap();
        let screen = scene.transform.apply(a.point, scene.origin);

        let hover = renderer
            .handle_pointer(&mut scene, PointerEvent::Move { x: screen.0, y: screen.1 }, &mut events)
            .unwrap();
        assert_eq!(hover, PointerOutcome::Hover(Some(a.key)));
        assert_eq!(scene.drawn_radius(a.key), Some(15.0 + 4.0));

        let click = renderer
            .handle_pointer(&mut scene, PointerEvent::Click { x: screen.0, y: screen.1 }, &mut events)
            .unwrap();
        assert_eq!(click, PointerOutcome::Clicked(a.key));
        let pending = events.take_pending();
        assert!(matches!(&pending[..], [MindMapEvent::NodeClick(node)] if node.name == "A"));

        renderer
            .handle_pointer(&mut scene, PointerEvent::Click { x: 1.0, y: 1.0 }, &mut events)
            .unwrap();
        assert!(!events.has_pending());
    }

    #[test]
    fn drag_moves_node_and_suppresses_click() {
        let (mut scene, layout) = rendered_scene();
        let mut renderer = SvgRenderer::default();
        let mut events = EventBus::new();
        let b = layout.node_by_name("B").unwrap();
        let screen = scene.transform.apply(b.point, scene.origin);

        renderer
            .handle_pointer(&mut scene, PointerEvent::Down { x: screen.0, y: screen.1 }, &mut events)
            .unwrap();
        let moved = renderer
            .handle_pointer(&mut scene, PointerEvent::Move { x: 10.0, y: 20.0 }, &mut events)
            .unwrap();
        let expected = scene.transform.invert((10.0, 20.0), scene.origin);
        assert_eq!(moved, PointerOutcome::Dragged { key: b.key, point: expected });
        assert_eq!(scene.nodes[&b.key].position(scene.clock), expected);
        assert_eq!(scene.links[&b.key].datum.target.point, expected);

        let ended = renderer
            .handle_pointer(&mut scene, PointerEvent::Up { x: 10.0, y: 20.0 }, &mut events)
            .unwrap();
        assert_eq!(ended, PointerOutcome::DragEnded(b.key));
        let click = renderer
            .handle_pointer(&mut scene, PointerEvent::Click { x: 10.0, y: 20.0 }, &mut events)
            .unwrap();
        assert_eq!(click, PointerOutcome::Ignored);
        assert!(!events.has_pending());
    }

    struct Blank;

    impl Renderer for Blank {}

    #[test]
    fn missing_operations_are_not_implemented() {
        let mut scene = Scene::new("svg", 10.0, 10.0);
        let err = Blank.render_nodes(&mut scene, &[], &Theme::default()).unwrap_err();
        assert_eq!(err, MindMapError::NotImplemented("Renderer::render_nodes"));
        let mut decorated = StyleDecorator::new(Blank, StyleConfig::default());
        assert!(decorated.render_links(&mut scene, &[], &Theme::default()).is_err());
    }
}

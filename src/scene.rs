use std::collections::{BTreeMap, HashSet};

use crate::layout::{Link, Orientation, PositionedNode};
use crate::tree::NodeId;
use crate::view::ViewTransform;

/// Time-based move between two points, sampled against the scene clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub start: f32,
    pub duration: f32,
}

impl Transition {
    pub fn still(point: (f32, f32)) -> Self {
        Self {
            from: point,
            to: point,
            start: 0.0,
            duration: 0.0,
        }
    }

    pub fn at(&self, clock: f32) -> (f32, f32) {
        if self.duration <= 0.0 || clock >= self.start + self.duration {
            return self.to;
        }
        let t = ((clock - self.start) / self.duration).clamp(0.0, 1.0);
        let eased = ease_cubic_in_out(t);
        (
            self.from.0 + (self.to.0 - self.from.0) * eased,
            self.from.1 + (self.to.1 - self.from.1) * eased,
        )
    }

    pub fn is_running(&self, clock: f32) -> bool {
        self.duration > 0.0 && clock < self.start + self.duration && self.from != self.to
    }
}

fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f32,
    pub text_color: String,
    pub font_family: String,
    pub font_size: f32,
    pub highlight_color: String,
    pub progress_color: String,
    pub progress_track_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkStyle {
    pub color: String,
    pub width: f32,
    pub highlight_color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub datum: PositionedNode,
    pub radius: f32,
    pub motion: Transition,
    pub style: NodeStyle,
    pub show_progress: bool,
    pub highlighted: bool,
}

impl SceneNode {
    pub fn position(&self, clock: f32) -> (f32, f32) {
        self.motion.at(clock)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneLink {
    pub datum: Link,
    pub style: LinkStyle,
    pub highlighted: bool,
}

/// Enter/update/exit result of one keyed reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderDiff {
    pub entered: Vec<NodeId>,
    pub updated: Vec<NodeId>,
    pub exited: Vec<NodeId>,
}

impl RenderDiff {
    pub fn is_unchanged(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub key: NodeId,
    pub moved: bool,
}

/// Retained scene graph: what is currently drawn, keyed by node identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: String,
    pub width: f32,
    pub height: f32,
    pub origin: (f32, f32),
    pub orientation: Orientation,
    pub transform: ViewTransform,
    pub background: String,
    pub nodes: BTreeMap<NodeId, SceneNode>,
    pub links: BTreeMap<NodeId, SceneLink>,
    /// Milliseconds, advanced by the host.
    pub clock: f32,
    pub hovered: Option<NodeId>,
    pub hover_pulse: f32,
    pub drag: Option<DragSession>,
    pub suppress_click: bool,
}

impl Scene {
    pub fn new(viewport: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            viewport: viewport.into(),
            width,
            height,
            origin: (width / 2.0, height / 2.0),
            orientation: Orientation::Radial,
            transform: ViewTransform::identity(),
            background: "#FFFFFF".to_string(),
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            clock: 0.0,
            hovered: None,
            hover_pulse: 0.0,
            drag: None,
            suppress_click: false,
        }
    }

    pub fn tick(&mut self, dt_ms: f32) {
        self.clock += dt_ms.max(0.0);
    }

    pub fn is_animating(&self) -> bool {
        self.nodes
            .values()
            .any(|node| node.motion.is_running(self.clock))
    }

    pub fn node_by_name(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.values().find(|node| node.datum.name == name)
    }

    /// Radius as drawn, including the hover pulse.
    pub fn drawn_radius(&self, key: NodeId) -> Option<f32> {
        let node = self.nodes.get(&key)?;
        let pulse = if self.hovered == Some(key) {
            self.hover_pulse
        } else {
            0.0
        };
        Some(node.radius + pulse)
    }

    /// Topmost node under a screen point.
    pub fn hit_test(&self, screen: (f32, f32)) -> Option<NodeId> {
        let (x, y) = self.transform.invert(screen, self.origin);
        self.nodes
            .iter()
            .rev()
            .find(|(key, node)| {
                let (nx, ny) = node.position(self.clock);
                let radius = self.drawn_radius(**key).unwrap_or(node.radius);
                (x - nx).hypot(y - ny) <= radius
            })
            .map(|(key, _)| *key)
    }

    /// Keyed enter/update/exit against `nodes`.
    ///
    /// A moved target restarts from the currently displayed position, so a
    /// new pass overrides any in-flight transition.
    pub fn reconcile_nodes(
        &mut self,
        nodes: &[PositionedNode],
        duration: f32,
        mut build: impl FnMut(&PositionedNode) -> SceneNode,
    ) -> RenderDiff {
        let mut diff = RenderDiff::default();
        let incoming: HashSet<NodeId> = nodes.iter().map(|node| node.key).collect();
        let clock = self.clock;
        self.nodes.retain(|key, _| {
            let keep = incoming.contains(key);
            if !keep {
                diff.exited.push(*key);
            }
            keep
        });
        for datum in nodes {
            let fresh = build(datum);
            match self.nodes.get_mut(&datum.key) {
                Some(existing) => {
                    if existing.motion.to != datum.point {
                        existing.motion = Transition {
                            from: existing.motion.at(clock),
                            to: datum.point,
                            start: clock,
                            duration,
                        };
                    }
                    existing.datum = fresh.datum;
                    existing.radius = fresh.radius;
                    existing.style = fresh.style;
                    existing.show_progress = fresh.show_progress;
                    diff.updated.push(datum.key);
                }
                None => {
                    self.nodes.insert(datum.key, fresh);
                    diff.entered.push(datum.key);
                }
            }
        }
        if self.hovered.is_some_and(|key| !self.nodes.contains_key(&key)) {
            self.hovered = None;
        }
        if self
            .drag
            .is_some_and(|drag| !self.nodes.contains_key(&drag.key))
        {
            self.drag = None;
        }
        diff
    }

    pub fn reconcile_links(
        &mut self,
        links: &[Link],
        mut build: impl FnMut(&Link) -> SceneLink,
    ) -> RenderDiff {
        let mut diff = RenderDiff::default();
        let incoming: HashSet<NodeId> = links.iter().map(Link::key).collect();
        self.links.retain(|key, _| {
            let keep = incoming.contains(key);
            if !keep {
                diff.exited.push(*key);
            }
            keep
        });
        for link in links {
            let fresh = build(link);
            match self.links.get_mut(&link.key()) {
                Some(existing) => {
                    existing.datum = fresh.datum;
                    existing.style = fresh.style;
                    diff.updated.push(link.key());
                }
                None => {
                    self.links.insert(link.key(), fresh);
                    diff.entered.push(link.key());
                }
            }
        }
        diff
    }

    /// Moves a node immediately (no transition) and updates its datum.
    pub fn place_node(&mut self, key: NodeId, point: (f32, f32)) -> Option<&SceneNode> {
        let orientation = self.orientation;
        for link in self.links.values_mut() {
            if link.datum.source.key == key {
                link.datum.source.relocate(orientation, point);
            }
            if link.datum.target.key == key {
                link.datum.target.relocate(orientation, point);
            }
        }
        let node = self.nodes.get_mut(&key)?;
        node.motion = Transition::still(point);
        node.datum.relocate(orientation, point);
        Some(node)
    }

    /// Highlights exactly `keys`; a link is lit when both of its ends are.
    pub fn set_highlight(&mut self, keys: &HashSet<NodeId>) {
        for (key, node) in &mut self.nodes {
            node.highlighted = keys.contains(key);
        }
        for link in self.links.values_mut() {
            link.highlighted =
                keys.contains(&link.datum.source.key) && keys.contains(&link.datum.target.key);
        }
    }

    pub fn clear_highlight(&mut self) {
        self.set_highlight(&HashSet::new());
    }

    /// Endpoints of a link as currently displayed.
    pub fn link_endpoints(&self, link: &SceneLink) -> ((f32, f32), (f32, f32)) {
        let source = self
            .nodes
            .get(&link.datum.source.key)
            .map(|node| node.position(self.clock))
            .unwrap_or(link.datum.source.point);
        let target = self
            .nodes
            .get(&link.datum.target.key)
            .map(|node| node.position(self.clock))
            .unwrap_or(link.datum.target.point);
        (source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datum(key: u64, point: (f32, f32)) -> PositionedNode {
        PositionedNode {
            key: NodeId(key),
            name: format!("N{key}"),
            depth: 0,
            parent: None,
            x: 0.0,
            y: 0.0,
            point,
            progress: 0,
        }
    }

    fn build(node: &PositionedNode) -> SceneNode {
        SceneNode {
            datum: node.clone(),
            radius: 15.0,
            motion: Transition::still(node.point),
            style: NodeStyle {
                fill: "#fff".to_string(),
                stroke: "#000".to_string(),
                stroke_width: 1.0,
                text_color: "#000".to_string(),
                font_family: "sans-serif".to_string(),
                font_size: 10.0,
                highlight_color: "#f00".to_string(),
                progress_color: "#0f0".to_string(),
                progress_track_color: "#eee".to_string(),
            },
            show_progress: false,
            highlighted: false,
        }
    }

    #[test]
    fn placed_node_rederives_polar_coordinates() {
        let mut scene = Scene::new("svg", 800.0, 400.0);
        scene.reconcile_nodes(&[datum(1, (0.0, -110.0))], 750.0, build);
        let placed = scene.place_node(NodeId(1), (0.0, 50.0)).unwrap();
        assert_eq!(placed.datum.point, (0.0, 50.0));
        assert!((placed.datum.x - std::f32::consts::PI).abs() < 1e-5);
        assert!((placed.datum.y - 50.0).abs() < 1e-5);
        assert_eq!(placed.position(0.0), (0.0, 50.0));
    }

    #[test]
    fn keyed_diff_enters_updates_and_exits() {
        let mut scene = Scene::new("svg", 800.0, 400.0);
        let diff = scene.reconcile_nodes(&[datum(1, (0.0, 0.0)), datum(2, (10.0, 0.0))], 0.0, build);
        assert_eq!(diff.entered, vec![NodeId(1), NodeId(2)]);
        let diff = scene.reconcile_nodes(&[datum(2, (10.0, 0.0)), datum(3, (0.0, 5.0))], 0.0, build);
        assert_eq!(diff.entered, vec![NodeId(3)]);
        assert_eq!(diff.updated, vec![NodeId(2)]);
        assert_eq!(diff.exited, vec![NodeId(1)]);
        let diff = scene.reconcile_nodes(&[datum(2, (10.0, 0.0)), datum(3, (0.0, 5.0))], 0.0, build);
        assert!(diff.is_unchanged());
    }

    #[test]
    fn new_pass_overrides_running_transition() {
        let mut scene = Scene::new("svg", 800.0, 400.0);
        scene.reconcile_nodes(&[datum(1, (0.0, 0.0))], 100.0, build);
        scene.reconcile_nodes(&[datum(1, (100.0, 0.0))], 100.0, build);
        scene.tick(50.0);
        let midway = scene.nodes[&NodeId(1)].position(scene.clock);
        assert!((midway.0 - 50.0).abs() < 1e-3);
        assert!(scene.is_animating());

        scene.reconcile_nodes(&[datum(1, (0.0, 100.0))], 100.0, build);
        let node = &scene.nodes[&NodeId(1)];
        assert_eq!(node.motion.from, midway);
        assert_eq!(node.motion.to, (0.0, 100.0));
        scene.tick(100.0);
        assert_eq!(scene.nodes[&NodeId(1)].position(scene.clock), (0.0, 100.0));
        assert!(!scene.is_animating());
    }

    #[test]
    fn hit_test_respects_transform_and_radius() {
        let mut scene = Scene::new("svg", 800.0, 400.0);
        scene.reconcile_nodes(&[datum(1, (0.0, 0.0)), datum(2, (100.0, 0.0))], 0.0, build);
        assert_eq!(scene.hit_test((400.0, 200.0)), Some(NodeId(1)));
        assert_eq!(scene.hit_test((505.0, 205.0)), Some(NodeId(2)));
        assert_eq!(scene.hit_test((450.0, 200.0)), None);
        scene.transform = ViewTransform {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 2.0,
        };
        assert_eq!(scene.hit_test((800.0, 400.0)), Some(NodeId(1)));
    }
}

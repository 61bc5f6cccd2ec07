use serde::{Deserialize, Serialize};

use crate::config::ZoomConfig;
use crate::tree::Node;

/// Pan/zoom state applied on top of the layout origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl ViewTransform {
    pub fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            translate_x: self.translate_x + dx,
            translate_y: self.translate_y + dy,
            ..self
        }
    }

    /// Rescales by `factor` around the screen point `(cx, cy)`, clamped to the zoom extent.
    pub fn zoomed(self, factor: f32, cx: f32, cy: f32, zoom: &ZoomConfig) -> Self {
        let scale = (self.scale * factor).clamp(zoom.min_scale, zoom.max_scale);
        let ratio = scale / self.scale;
        Self {
            translate_x: cx - (cx - self.translate_x) * ratio,
            translate_y: cy - (cy - self.translate_y) * ratio,
            scale,
        }
    }

    /// Screen position of a layout point, given the layout origin.
    pub fn apply(&self, point: (f32, f32), origin: (f32, f32)) -> (f32, f32) {
        (
            self.translate_x + self.scale * (point.0 + origin.0),
            self.translate_y + self.scale * (point.1 + origin.1),
        )
    }

    pub fn invert(&self, screen: (f32, f32), origin: (f32, f32)) -> (f32, f32) {
        (
            (screen.0 - self.translate_x) / self.scale - origin.0,
            (screen.1 - self.translate_y) / self.scale - origin.1,
        )
    }

    pub fn to_svg(&self, origin: (f32, f32)) -> String {
        format!(
            "translate({:.2},{:.2}) scale({:.4}) translate({:.2},{:.2})",
            self.translate_x, self.translate_y, self.scale, origin.0, origin.1
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub snapshot: Node,
    pub transform: ViewTransform,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub transform: ViewTransform,
    pub history: Vec<HistoryEntry>,
}

impl ViewState {
    pub fn push(&mut self, snapshot: Node) {
        self.history.push(HistoryEntry {
            snapshot,
            transform: self.transform,
        });
        self.transform = ViewTransform::identity();
    }

    /// Restores the most recent entry's transform and returns its tree.
    pub fn pop(&mut self) -> Option<Node> {
        let entry = self.history.pop()?;
        self.transform = entry.transform;
        Some(entry.snapshot)
    }
}

use crate::theme::{StyleConfig, Theme};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    /// Radial distance between consecutive depths.
    pub level_spacing: f32,
    /// Kept free between the outermost ring and the viewport edge.
    pub radius_margin: f32,
    pub sibling_separation: f32,
    pub cousin_separation: f32,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            level_spacing: 110.0,
            radius_margin: 120.0,
            sibling_separation: 1.0,
            cousin_separation: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizontalConfig {
    /// Total horizontal margin; half of it offsets the root from the left edge.
    pub margin: f32,
    pub sibling_separation: f32,
    pub cousin_separation: f32,
}

impl Default for HorizontalConfig {
    fn default() -> Self {
        Self {
            margin: 160.0,
            sibling_separation: 1.0,
            cousin_separation: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub radial: RadialConfig,
    pub horizontal: HorizontalConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Duration of position transitions, in milliseconds.
    pub transition_ms: f32,
    /// Extra radius while a node is hovered.
    pub hover_pulse: f32,
    pub progress_ring: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            transition_ms: 750.0,
            hover_pulse: 4.0,
            progress_ring: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Wheel delta (pixels) that doubles or halves the scale.
    pub wheel_step: f32,
}

impl ZoomConfig {
    /// Bounds ordered `min <= max`, or `None` when a bound or the wheel step is
    /// not a positive finite number.
    pub fn normalized(&self) -> Option<Self> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !(positive(self.min_scale) && positive(self.max_scale) && positive(self.wheel_step)) {
            return None;
        }
        Some(Self {
            min_scale: self.min_scale.min(self.max_scale),
            max_scale: self.min_scale.max(self.max_scale),
            wheel_step: self.wheel_step,
        })
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.0,
            wheel_step: 500.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub zoom: ZoomConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    style: Option<StyleConfig>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfig>,
    zoom: Option<ZoomConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "default" || theme_name == "mindmap" {
            config.theme = Theme::mindmap_default();
        } else {
            tracing::warn!(theme = theme_name, "unknown theme; keeping the default");
        }
    }
    if let Some(style) = parsed.style {
        config.theme = config.theme.with_style(&style);
    }
    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    if let Some(zoom) = parsed.zoom {
        config.zoom = zoom;
    }
    config.zoom = config.zoom.normalized().ok_or_else(|| {
        anyhow::anyhow!(
            "zoom bounds must be positive: min_scale={}, max_scale={}, wheel_step={}",
            config.zoom.min_scale,
            config.zoom.max_scale,
            config.zoom.wheel_step
        )
    })?;
    Ok(config)
}

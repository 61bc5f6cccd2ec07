use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub text_color: String,
    pub link_color: String,
    pub link_width: f32,
    pub highlight_color: String,
    pub progress_color: String,
    pub progress_track_color: String,
    pub background: String,
}

impl Theme {
    pub fn mindmap_default() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 10.0,
            node_fill: "#ECECFF".to_string(),
            node_stroke: "#9370DB".to_string(),
            node_stroke_width: 1.5,
            text_color: "#000000".to_string(),
            link_color: "#999999".to_string(),
            link_width: 1.5,
            highlight_color: "#FF7F0E".to_string(),
            progress_color: "#4CAF50".to_string(),
            progress_track_color: "#E0E0E0".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#C7D2E5".to_string(),
            node_stroke_width: 1.2,
            text_color: "#1C2430".to_string(),
            link_color: "#7A8AA6".to_string(),
            link_width: 1.4,
            highlight_color: "#2563EB".to_string(),
            progress_color: "#22C55E".to_string(),
            progress_track_color: "#EEF2F8".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    /// Returns a copy with every field the style config sets replaced.
    pub fn with_style(&self, style: &StyleConfig) -> Self {
        let mut theme = self.clone();
        if let Some(v) = &style.font_family {
            theme.font_family = v.clone();
        }
        if let Some(v) = style.font_size {
            theme.font_size = v;
        }
        if let Some(v) = &style.node_fill {
            theme.node_fill = v.clone();
        }
        if let Some(v) = &style.node_stroke {
            theme.node_stroke = v.clone();
        }
        if let Some(v) = style.node_stroke_width {
            theme.node_stroke_width = v;
        }
        if let Some(v) = &style.text_color {
            theme.text_color = v.clone();
        }
        if let Some(v) = &style.link_color {
            theme.link_color = v.clone();
        }
        if let Some(v) = style.link_width {
            theme.link_width = v;
        }
        if let Some(v) = &style.highlight_color {
            theme.highlight_color = v.clone();
        }
        if let Some(v) = &style.progress_color {
            theme.progress_color = v.clone();
        }
        if let Some(v) = &style.background {
            theme.background = v.clone();
        }
        theme
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::mindmap_default()
    }
}

/// Caller-supplied partial style (`styleConfig` in host JSON).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub node_fill: Option<String>,
    pub node_stroke: Option<String>,
    pub node_stroke_width: Option<f32>,
    pub text_color: Option<String>,
    pub link_color: Option<String>,
    pub link_width: Option<f32>,
    pub highlight_color: Option<String>,
    pub progress_color: Option<String>,
    pub background: Option<String>,
}

impl StyleConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

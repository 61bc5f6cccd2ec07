use radial_mindmap::{
    Config, LayoutStrategy, MindMap, MindMapEvent, MindMapOptions, Node, PointerEvent,
    StyleConfig, Theme, parse_tree,
};
use serde::Deserialize;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MindMapHandleOptions {
    viewport: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    theme: Option<String>,
    layout: Option<String>,
    style: Option<StyleConfig>,
}

fn build_options(data: Option<Node>, options: MindMapHandleOptions) -> Result<MindMapOptions, String> {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
    }
    let layout = options.layout.as_deref().unwrap_or("radial");
    let layout_strategy = LayoutStrategy::from_name(layout, &config.layout)
        .ok_or_else(|| format!("unknown layout: {layout}"))?;

    let mut mind_map_options = MindMapOptions::new(
        options.viewport.unwrap_or_else(|| "svg".to_string()),
        options.width.unwrap_or(config.render.width),
        options.height.unwrap_or(config.render.height),
    )
    .with_config(config);
    mind_map_options.data = data;
    mind_map_options.style_config = options.style;
    mind_map_options.layout_strategy = Some(layout_strategy);
    Ok(mind_map_options)
}

fn pointer_event(kind: &str, x: f32, y: f32, delta: f32) -> Option<PointerEvent> {
    let event = match kind {
        "move" | "mousemove" => PointerEvent::Move { x, y },
        "down" | "mousedown" => PointerEvent::Down { x, y },
        "up" | "mouseup" => PointerEvent::Up { x, y },
        "click" => PointerEvent::Click { x, y },
        "dblclick" | "doubleclick" => PointerEvent::DoubleClick { x, y },
        "wheel" => PointerEvent::Wheel { x, y, delta },
        "leave" | "mouseleave" => PointerEvent::Leave,
        _ => return None,
    };
    Some(event)
}

/// JSON shape handed to JavaScript listeners, tagged with the event name.
fn event_payload(event: &MindMapEvent) -> Value {
    let kind = event.kind().as_str();
    match event {
        MindMapEvent::Updated { nodes, links } => {
            json!({ "type": kind, "nodes": nodes, "links": links })
        }
        MindMapEvent::Zoom(transform) => json!({ "type": kind, "transform": transform }),
        MindMapEvent::NodeClick(node) | MindMapEvent::NodeDoubleClick(node) => {
            json!({ "type": kind, "node": node })
        }
    }
}

/// Subscribes `deliver` to the named event, handing it serialized payloads.
fn forward_events(
    map: &mut MindMap,
    event_name: &str,
    mut deliver: impl FnMut(Value) + 'static,
) -> Result<(), String> {
    map.on_named(event_name, move |event| deliver(event_payload(event)))
        .map_err(|err| err.to_string())
}

fn js_error(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// A live mind map driven from JavaScript.
#[wasm_bindgen]
pub struct MindMapHandle {
    inner: MindMap,
}

#[wasm_bindgen]
impl MindMapHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(data_json: Option<String>, options_json: Option<String>) -> Result<MindMapHandle, JsValue> {
        let data = data_json
            .as_deref()
            .map(parse_tree)
            .transpose()
            .map_err(js_error)?;
        let options = match options_json {
            Some(raw_options) => serde_json::from_str::<MindMapHandleOptions>(&raw_options)
                .map_err(js_error)?,
            None => MindMapHandleOptions::default(),
        };
        let options = build_options(data, options).map_err(js_error)?;
        let inner = MindMap::new(options).map_err(js_error)?;
        Ok(MindMapHandle { inner })
    }

    /// Returns false when the parent is missing or the name is taken.
    pub fn add_node(&mut self, parent: &str, name: &str) -> Result<bool, JsValue> {
        self.inner
            .add_node(parent, name)
            .map(|id| id.is_some())
            .map_err(js_error)
    }

    pub fn set_new_root(&mut self, name: &str) -> Result<bool, JsValue> {
        self.inner.set_new_root(name).map_err(js_error)
    }

    pub fn go_back(&mut self) -> Result<bool, JsValue> {
        self.inner.go_back().map_err(js_error)
    }

    pub fn click_node(&mut self, name: &str) -> Result<bool, JsValue> {
        self.inner.click_node(name).map_err(js_error)
    }

    /// Re-dispatches a click on the side panel breadcrumb segment at `index`.
    pub fn click_breadcrumb(&mut self, index: usize) -> Result<bool, JsValue> {
        self.inner.click_breadcrumb(index).map_err(js_error)
    }

    /// Registers `callback` for `"updated"`, `"zoom"`, `"nodeClick"` or
    /// `"nodeDoubleClick"`. It receives the event as a plain object.
    pub fn on(&mut self, event_name: &str, callback: js_sys::Function) -> Result<(), JsValue> {
        forward_events(&mut self.inner, event_name, move |payload| {
            let Ok(value) = js_sys::JSON::parse(&payload.to_string()) else {
                return;
            };
            // Exceptions thrown by the listener are not caught by the bus.
            let _ = callback.call1(&JsValue::NULL, &value);
        })
        .map_err(js_error)
    }

    /// Feeds a DOM pointer event; returns true when it hit a node.
    pub fn pointer(&mut self, kind: &str, x: f32, y: f32, delta: f32) -> Result<bool, JsValue> {
        let event = pointer_event(kind, x, y, delta)
            .ok_or_else(|| js_error(format!("unknown pointer event: {kind}")))?;
        let outcome = self.inner.handle_pointer(event).map_err(js_error)?;
        Ok(!matches!(
            outcome,
            radial_mindmap::PointerOutcome::Ignored | radial_mindmap::PointerOutcome::Hover(None)
        ))
    }

    /// Advances transitions; returns whether any are still running.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        self.inner.tick(dt_ms);
        self.inner.scene().is_animating()
    }

    pub fn to_svg(&self) -> String {
        self.inner.to_svg()
    }

    pub fn side_panel_html(&self) -> Option<String> {
        self.inner.side_panel().map(|panel| panel.to_html())
    }
}

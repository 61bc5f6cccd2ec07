use crate::layout::{Orientation, TreeLayout};
use crate::view::ViewTransform;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub orientation: Orientation,
    pub origin: [f32; 2],
    pub extent: [f32; 2],
    pub transform: ViewTransform,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub key: u64,
    pub name: String,
    pub depth: usize,
    pub parent: Option<u64>,
    pub x: f32,
    pub y: f32,
    pub point: [f32; 2],
    pub progress: u8,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub key: u64,
    pub source: String,
    pub target: String,
    pub points: [[f32; 2]; 2],
}

impl LayoutDump {
    pub fn from_layout(layout: &TreeLayout, transform: ViewTransform) -> Self {
        let nodes = layout
            .descendants
            .iter()
            .map(|node| NodeDump {
                key: node.key.0,
                name: node.name.clone(),
                depth: node.depth,
                parent: node.parent.map(|parent| parent.0),
                x: node.x,
                y: node.y,
                point: [node.point.0, node.point.1],
                progress: node.progress,
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                key: link.key().0,
                source: link.source.name.clone(),
                target: link.target.name.clone(),
                points: [
                    [link.source.point.0, link.source.point.1],
                    [link.target.point.0, link.target.point.1],
                ],
            })
            .collect();

        LayoutDump {
            orientation: layout.orientation,
            origin: [layout.origin.0, layout.origin.1],
            extent: [layout.extent.0, layout.extent.1],
            transform,
            nodes,
            links,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &TreeLayout,
    transform: ViewTransform,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, transform);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

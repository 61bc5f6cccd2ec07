use crate::config::load_config;
use crate::layout::LayoutStrategy;
use crate::layout_dump::write_layout_dump;
use crate::mindmap::{MindMap, MindMapOptions};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::write_output_svg;
use crate::tree::parse_tree;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mindmap", version, about = "Render a JSON tree as a radial or horizontal mind map")]
pub struct Args {
    /// Input tree (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, style overrides, layout and zoom settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 800.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 400.0)]
    pub height: f32,

    /// Layout variant
    #[arg(long = "layout", value_enum, default_value = "radial")]
    pub layout: LayoutKind,

    /// Append CHILD under the first node named PARENT (repeatable)
    #[arg(long = "add", value_name = "PARENT=CHILD", value_parser = parse_addition)]
    pub add: Vec<(String, String)>,

    /// Re-root the map at this node before rendering
    #[arg(long = "root", value_name = "NAME")]
    pub root: Option<String>,

    /// Select this node (highlight its ancestor path and fill the side panel)
    #[arg(long = "select", value_name = "NAME")]
    pub select: Option<String>,

    /// Write the side panel of the selected node as HTML
    #[arg(long = "panel", value_name = "FILE")]
    pub panel: Option<PathBuf>,

    /// Write positioned nodes and links as JSON
    #[arg(long = "dump-layout", value_name = "FILE")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Radial,
    Horizontal,
}

impl LayoutKind {
    fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Radial => "radial",
            LayoutKind::Horizontal => "horizontal",
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let data = parse_tree(&input)?;
    let layout_strategy = LayoutStrategy::from_name(args.layout.as_str(), &config.layout)
        .ok_or_else(|| anyhow::anyhow!("unknown layout: {}", args.layout.as_str()))?;

    let mut options = MindMapOptions::new("svg", args.width, args.height)
        .with_data(data)
        .with_config(config);
    options.layout_strategy = Some(layout_strategy);
    let mut map = MindMap::new(options)?;

    for (parent, child) in &args.add {
        map.add_node(parent, child.as_str())?;
    }
    if let Some(root) = &args.root {
        if !map.set_new_root(root)? {
            return Err(anyhow::anyhow!("node not found: {root}"));
        }
    }
    if let Some(name) = &args.select {
        if !map.click_node(name)? {
            return Err(anyhow::anyhow!("node not found: {name}"));
        }
    }
    // Settle every transition so the output shows final positions.
    map.tick(map.config().render.transition_ms);

    if let Some(path) = &args.panel {
        let panel = map
            .side_panel()
            .ok_or_else(|| anyhow::anyhow!("--panel requires --select"))?;
        std::fs::write(path, panel.to_html())?;
    }
    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, map.layout(), map.transform())?;
    }

    let svg = map.to_svg();
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &map)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, map: &MindMap) -> Result<()> {
    write_output_png(svg, output, &map.config().render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _map: &MindMap) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_addition(raw: &str) -> std::result::Result<(String, String), String> {
    let (parent, child) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PARENT=CHILD, got `{raw}`"))?;
    let (parent, child) = (parent.trim(), child.trim());
    if parent.is_empty() || child.is_empty() {
        return Err(format!("expected PARENT=CHILD, got `{raw}`"));
    }
    Ok((parent.to_string(), child.to_string()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

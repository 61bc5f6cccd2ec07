use serde::Serialize;

use crate::render::escape_xml;
use crate::tree::{Node, NodeId};

const BREADCRUMB_MAX_CHARS: usize = 20;
const BREADCRUMB_KEEP_CHARS: usize = 17;
const DEFAULT_DETAIL: &str = "No additional details available.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreadcrumbSegment {
    pub key: NodeId,
    pub name: String,
    pub label: String,
}

/// Side panel content for the selected node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidePanel {
    /// Root first, selected node last.
    pub breadcrumb: Vec<BreadcrumbSegment>,
    pub title: String,
    /// Rich text, rendered unescaped.
    pub description: String,
    pub details: Vec<String>,
}

/// Shortens a breadcrumb label to 17 chars plus `...` once it exceeds 20.
pub fn truncate_label(name: &str) -> String {
    if name.chars().count() > BREADCRUMB_MAX_CHARS {
        let head: String = name.chars().take(BREADCRUMB_KEEP_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

impl SidePanel {
    pub fn for_path(path: &[&Node]) -> Option<Self> {
        let node = path.last()?;
        let breadcrumb = path
            .iter()
            .map(|segment| BreadcrumbSegment {
                key: segment.id,
                name: segment.name.clone(),
                label: truncate_label(&segment.name),
            })
            .collect();
        let (description, details) = match &node.summary {
            Some(summary) => (summary.description.clone(), summary.details.clone()),
            None => (
                format!("Information about {}.", node.name),
                vec![DEFAULT_DETAIL.to_string()],
            ),
        };
        Some(Self {
            breadcrumb,
            title: node.name.clone(),
            description,
            details,
        })
    }

    pub fn ancestor_names(&self) -> Vec<&str> {
        self.breadcrumb
            .iter()
            .map(|segment| segment.name.as_str())
            .collect()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<aside class=\"side-panel\"><nav class=\"breadcrumb\">");
        for (idx, segment) in self.breadcrumb.iter().enumerate() {
            if idx > 0 {
                html.push_str("<span class=\"separator\"> &gt; </span>");
            }
            html.push_str(&format!(
                "<a class=\"crumb\" data-index=\"{idx}\" title=\"{}\">{}</a>",
                escape_xml(&segment.name),
                escape_xml(&segment.label)
            ));
        }
        html.push_str("</nav>");
        html.push_str(&format!("<h2>{}</h2>", escape_xml(&self.title)));
        html.push_str(&format!("<div class=\"description\">{}</div>", self.description));
        html.push_str("<ul class=\"details\">");
        for detail in &self.details {
            html.push_str(&format!("<li>{}</li>", escape_xml(detail)));
        }
        html.push_str("</ul></aside>");
        html
    }
}

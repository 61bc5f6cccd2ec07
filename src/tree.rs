use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MindMapError, Result};

/// Stable per-instance identity used as the render-diff key.
///
/// Zero means "not yet assigned"; the tree model hands out ids starting at 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Rich-text body, passed through to the side panel as-is.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip)]
    pub id: NodeId,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            summary: None,
            progress: None,
            id: NodeId::default(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_summary(mut self, summary: Summary) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order depth-first search; the first match wins.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_id(id))
    }

    /// Root-to-target chain (inclusive) for the first pre-order match of `name`.
    pub fn path_to(&self, name: &str) -> Option<Vec<&Node>> {
        if self.name == name {
            return Some(vec![self]);
        }
        for child in &self.children {
            if let Some(mut path) = child.path_to(name) {
                path.insert(0, self);
                return Some(path);
            }
        }
        None
    }

    pub fn path_to_id(&self, id: NodeId) -> Option<Vec<&Node>> {
        if self.id == id {
            return Some(vec![self]);
        }
        for child in &self.children {
            if let Some(mut path) = child.path_to_id(id) {
                path.insert(0, self);
                return Some(path);
            }
        }
        None
    }

    /// Visits every node in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// What `add_node` accepts: a bare name or a full node (optionally with its own subtree).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSpec {
    Name(String),
    Node(Node),
}

impl NodeSpec {
    pub fn into_node(self) -> Node {
        match self {
            Self::Name(name) => Node::new(name),
            Self::Node(node) => node,
        }
    }
}

impl From<&str> for NodeSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for NodeSpec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Node> for NodeSpec {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

/// Deterministic stand-in for a random 0..=100 progress value, fixed at creation.
pub fn default_progress(name: &str) -> u8 {
    // FNV-1a
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash % 101) as u8
}

/// Owns the hierarchy and the id counter.
#[derive(Debug, Clone)]
pub struct TreeModel {
    root: Node,
    next_id: u64,
}

impl TreeModel {
    pub fn new(mut root: Node) -> Self {
        let mut next_id = 1;
        prepare_subtree(&mut root, &mut next_id);
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        root.walk(&mut |node| {
            if !seen.insert(node.name.as_str()) {
                duplicates.push(node.name.clone());
            }
        });
        for name in duplicates {
            tracing::warn!(
                name = %name,
                "duplicate node name in tree data; lookups resolve to the first match"
            );
        }
        Self { root, next_id }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.root.count()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, name: &str) -> bool {
        self.root.find(name).is_some()
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.root.find(name)
    }

    pub fn find_node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.root.find_mut(name)
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        self.root.find_by_id(id)
    }

    pub fn ancestor_path(&self, name: &str) -> Option<Vec<&Node>> {
        self.root.path_to(name)
    }

    pub fn ancestor_path_by_id(&self, id: NodeId) -> Option<Vec<&Node>> {
        self.root.path_to_id(id)
    }

    /// Appends a child to the first node named `parent_name`.
    pub fn add_node(&mut self, parent_name: &str, spec: impl Into<NodeSpec>) -> Result<NodeId> {
        let mut node = spec.into().into_node();
        let mut incoming = HashSet::new();
        let mut clash = None;
        node.walk(&mut |candidate| {
            if clash.is_none()
                && (!incoming.insert(candidate.name.clone()) || self.contains(&candidate.name))
            {
                clash = Some(candidate.name.clone());
            }
        });
        if !self.contains(parent_name) {
            return Err(MindMapError::ParentNotFound(parent_name.to_string()));
        }
        if let Some(name) = clash {
            return Err(MindMapError::DuplicateName(name));
        }
        // Ids from another tree could collide with ours.
        clear_ids(&mut node);
        prepare_subtree(&mut node, &mut self.next_id);
        let id = node.id;
        let parent = self
            .root
            .find_mut(parent_name)
            .ok_or_else(|| MindMapError::ParentNotFound(parent_name.to_string()))?;
        parent.children.push(node);
        Ok(id)
    }

    /// Structural clone of the subtree rooted at `name`. O(size of subtree).
    pub fn subtree(&self, name: &str) -> Option<Node> {
        self.root.find(name).cloned()
    }

    /// Structural clone of the whole tree. O(size of tree).
    pub fn snapshot(&self) -> Node {
        self.root.clone()
    }

    /// Swaps in a new root, keeping the id counter monotonic.
    pub fn replace_root(&mut self, mut root: Node) {
        prepare_subtree(&mut root, &mut self.next_id);
        self.root = root;
    }
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new(Node::new("Root"))
    }
}

/// Assigns ids and default progress to nodes that have none yet.
fn prepare_subtree(node: &mut Node, next_id: &mut u64) {
    if node.id.is_assigned() {
        *next_id = (*next_id).max(node.id.0 + 1);
    } else {
        node.id = NodeId(*next_id);
        *next_id += 1;
    }
    node.progress = Some(match node.progress {
        Some(progress) => progress.min(100),
        None => default_progress(&node.name),
    });
    for child in &mut node.children {
        prepare_subtree(child, next_id);
    }
}

fn clear_ids(node: &mut Node) {
    node.id = NodeId::default();
    for child in &mut node.children {
        clear_ids(child);
    }
}

/// Parses tree data, accepting strict JSON first and JSON5 as a fallback.
pub fn parse_tree(input: &str) -> anyhow::Result<Node> {
    match serde_json::from_str::<Node>(input) {
        Ok(node) => Ok(node),
        Err(json_err) => json5::from_str::<Node>(input)
            .map_err(|_| anyhow::anyhow!("invalid tree data: {json_err}")),
    }
}

pub fn load_tree(path: &Path) -> anyhow::Result<Node> {
    let contents = std::fs::read_to_string(path)?;
    parse_tree(&contents)
}

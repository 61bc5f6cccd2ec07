//! Tidy-tree placement (Buchheim, Jünger and Leipert's linear-time Walker),
//! normalised the same way d3's `tree()` fits a hierarchy into a fixed extent.

use crate::tree::Node;

/// Gap weights between neighbouring nodes on the same depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Separation {
    pub sibling: f32,
    pub cousin: f32,
}

/// One placed node, indexed by its pre-order position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TidySlot {
    pub x: f32,
    pub depth: usize,
    pub parent: Option<usize>,
}

struct WalkNode {
    parent: usize,
    children: Vec<usize>,
    order: usize,
    depth: usize,
    prelim: f32,
    modifier: f32,
    change: f32,
    shift: f32,
    thread: Option<usize>,
    ancestor: usize,
    apportion_anchor: Option<usize>,
    x: f32,
}

struct Walker {
    // Index 0 is a virtual parent of the real root, which sits at index 1.
    nodes: Vec<WalkNode>,
    separation: Separation,
}

const ROOT: usize = 1;

impl Walker {
    fn new(root: &Node, separation: Separation) -> Self {
        let mut walker = Self {
            nodes: Vec::with_capacity(root.count() + 1),
            separation,
        };
        walker.push(0, 0, 0);
        walker.insert(root, 0, 0, 0);
        walker.nodes[0].children.push(ROOT);
        walker
    }

    fn push(&mut self, parent: usize, order: usize, depth: usize) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(WalkNode {
            parent,
            children: Vec::new(),
            order,
            depth,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: idx,
            apportion_anchor: None,
            x: 0.0,
        });
        idx
    }

    fn insert(&mut self, node: &Node, parent: usize, order: usize, depth: usize) -> usize {
        let idx = self.push(parent, order, depth);
        for (child_order, child) in node.children.iter().enumerate() {
            let child_idx = self.insert(child, idx, child_order, depth + 1);
            self.nodes[idx].children.push(child_idx);
        }
        idx
    }

    fn separation(&self, a: usize, b: usize) -> f32 {
        if self.nodes[a].parent == self.nodes[b].parent {
            self.separation.sibling
        } else {
            self.separation.cousin
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f32) {
        let spread = (self.nodes[wp].order - self.nodes[wm].order) as f32;
        let change = shift / spread;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = self.nodes[v].children.clone();
        for &w in children.iter().rev() {
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        if node.order == 0 {
            None
        } else {
            Some(self.nodes[node.parent].children[node.order - 1])
        }
    }

    fn first_walk(&mut self, v: usize) {
        let children = self.nodes[v].children.clone();
        for &child in &children {
            self.first_walk(child);
        }
        let w = self.left_sibling(v);
        if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            if let Some(w) = w {
                self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
            } else {
                self.nodes[v].prelim = midpoint;
            }
        } else if let Some(w) = w {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }
        let parent = self.nodes[v].parent;
        let anchor = self.nodes[parent]
            .apportion_anchor
            .unwrap_or(self.nodes[parent].children[0]);
        let anchor = self.apportion(v, w, anchor);
        self.nodes[parent].apportion_anchor = Some(anchor);
    }

    fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = w else {
            return ancestor;
        };
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.nodes[self.nodes[vip].parent].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let (mut inner_left, mut inner_right);
        loop {
            inner_left = self.next_right(vim);
            inner_right = self.next_left(vip);
            let (Some(next_vim), Some(next_vip)) = (inner_left, inner_right) else {
                break;
            };
            let (Some(next_vom), Some(next_vop)) = (self.next_left(vom), self.next_right(vop))
            else {
                break;
            };
            vim = next_vim;
            vip = next_vip;
            vom = next_vom;
            vop = next_vop;
            self.nodes[vop].ancestor = v;
            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;
        }
        if inner_left.is_some() && self.next_right(vop).is_none() {
            self.nodes[vop].thread = inner_left;
            self.nodes[vop].modifier += sim - sop;
        }
        if inner_right.is_some() && self.next_left(vom).is_none() {
            self.nodes[vom].thread = inner_right;
            self.nodes[vom].modifier += sip - som;
            ancestor = v;
        }
        ancestor
    }

    fn second_walk(&mut self) {
        // Arena order is pre-order, so a parent's modifier is final before its children read it.
        for idx in ROOT..self.nodes.len() {
            let parent_modifier = self.nodes[self.nodes[idx].parent].modifier;
            let node = &mut self.nodes[idx];
            node.x = node.prelim + parent_modifier;
            node.modifier += parent_modifier;
        }
    }
}

/// Places `root` and fits the breadth axis into `[0, extent]`.
pub(crate) fn tidy_tree(root: &Node, separation: Separation, extent: f32) -> Vec<TidySlot> {
    let mut walker = Walker::new(root, separation);
    walker.first_walk(ROOT);
    walker.nodes[0].modifier = -walker.nodes[ROOT].prelim;
    walker.second_walk();

    let mut left = ROOT;
    let mut right = ROOT;
    for idx in ROOT..walker.nodes.len() {
        if walker.nodes[idx].x < walker.nodes[left].x {
            left = idx;
        }
        if walker.nodes[idx].x > walker.nodes[right].x {
            right = idx;
        }
    }
    let s = if left == right {
        1.0
    } else {
        walker.separation(left, right) / 2.0
    };
    let tx = s - walker.nodes[left].x;
    let kx = extent / (walker.nodes[right].x + s + tx);

    walker.nodes[ROOT..]
        .iter()
        .map(|node| TidySlot {
            x: (node.x + tx) * kx,
            depth: node.depth,
            parent: (node.parent >= ROOT).then(|| node.parent - ROOT),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEP: Separation = Separation {
        sibling: 1.0,
        cousin: 2.0,
    };

    #[test]
    fn single_node_sits_mid_extent() {
        let slots = tidy_tree(&Node::new("Root"), SEP, 10.0);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].x, 5.0);
        assert_eq!(slots[0].parent, None);
    }

    #[test]
    fn parent_centres_over_children() {
        let root = Node::new("R").with_children(vec![Node::new("A"), Node::new("B"), Node::new("C")]);
        let slots = tidy_tree(&root, SEP, 100.0);
        assert!((slots[0].x - slots[2].x).abs() < 1e-4);
        assert!(slots[1].x < slots[2].x && slots[2].x < slots[3].x);
        let gap_ab = slots[2].x - slots[1].x;
        let gap_bc = slots[3].x - slots[2].x;
        assert!((gap_ab - gap_bc).abs() < 1e-4);
        assert_eq!(slots[3].parent, Some(0));
    }

    #[test]
    fn cousins_get_wider_gap() {
        let root = Node::new("R").with_children(vec![
            Node::new("A").with_children(vec![Node::new("A1"), Node::new("A2")]),
            Node::new("B").with_children(vec![Node::new("B1"), Node::new("B2")]),
        ]);
        let slots = tidy_tree(&root, SEP, 100.0);
        // Pre-order: R, A, A1, A2, B, B1, B2
        let sibling_gap = slots[3].x - slots[2].x;
        let cousin_gap = slots[5].x - slots[3].x;
        assert!((cousin_gap - 2.0 * sibling_gap).abs() < 1e-3);
    }

    #[test]
    fn deep_uneven_subtrees_do_not_overlap() {
        let root = Node::new("R").with_children(vec![
            Node::new("A").with_children(vec![Node::new("A1").with_children(vec![
                Node::new("A11"),
                Node::new("A12"),
                Node::new("A13"),
            ])]),
            Node::new("B"),
            Node::new("C").with_children(vec![Node::new("C1").with_children(vec![
                Node::new("C11"),
                Node::new("C12"),
            ])]),
        ]);
        let slots = tidy_tree(&root, SEP, 100.0);
        let mut by_depth: std::collections::BTreeMap<usize, Vec<f32>> = Default::default();
        for slot in &slots {
            by_depth.entry(slot.depth).or_default().push(slot.x);
        }
        for xs in by_depth.values() {
            for pair in xs.windows(2) {
                assert!(pair[1] > pair[0], "nodes overlap or reorder: {xs:?}");
            }
        }
        assert!(slots.iter().all(|slot| slot.x > 0.0 && slot.x < 100.0));
    }
}

//! Merged call tree held by the flame graph.
//!
//! Nodes live in an arena and keep a parent link, so label and layout code can
//! walk upwards without reference cycles. The root is always `NodeId::ROOT`;
//! merging never replaces it.

use crate::protocol::FrameNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    value: u64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    highlighted: bool,
}

/// Result of a name search over the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSummary {
    /// Every frame whose name contains the term.
    pub matches: usize,
    /// Summed value of matches that have no matching ancestor.
    pub matched_value: u64,
    /// `matched_value` as a percentage of the root value.
    pub percent: f64,
}

#[derive(Debug, Clone)]
pub struct FlameTree {
    nodes: Vec<Node>,
}

impl FlameTree {
    pub fn new(root: &FrameNode) -> Self {
        let mut tree = Self {
            nodes: vec![Node {
                name: root.name.clone(),
                value: root.value,
                parent: None,
                children: Vec::new(),
                highlighted: false,
            }],
        };
        for child in &root.children {
            tree.attach(NodeId::ROOT, child);
        }
        tree
    }

    pub fn placeholder() -> Self {
        Self::new(&FrameNode::placeholder())
    }

    /// Append a copy of `frame` and its subtree under `parent`.
    fn attach(&mut self, parent: NodeId, frame: &FrameNode) {
        let mut pending = vec![(parent, frame)];
        while let Some((parent, frame)) = pending.pop() {
            let id = NodeId(self.nodes.len());
            self.nodes.push(Node {
                name: frame.name.clone(),
                value: frame.value,
                parent: Some(parent),
                children: Vec::new(),
                highlighted: false,
            });
            self.nodes[parent.0].children.push(id);
            pending.extend(frame.children.iter().rev().map(|c| (id, c)));
        }
    }

    /// Fold `incoming` into the tree.
    ///
    /// The incoming root always lands on `NodeId::ROOT`. Below it, children
    /// merge by name: a match adds its value and descends, anything else is
    /// appended as a new subtree.
    pub fn merge(&mut self, incoming: &FrameNode) {
        let mut pending = vec![(NodeId::ROOT, incoming)];
        while let Some((target, frame)) = pending.pop() {
            let node = &mut self.nodes[target.0];
            node.value = node.value.saturating_add(frame.value);

            for child in &frame.children {
                match self.child_named(target, &child.name) {
                    Some(existing) => pending.push((existing, child)),
                    None => self.attach(target, child),
                }
            }
        }
    }

    pub fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|c| self.nodes[c.0].name == name)
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn value(&self, id: NodeId) -> u64 {
        self.nodes[id.0].value
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Children ordered by name, as the graph draws them.
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = self.nodes[id.0].children.clone();
        out.sort_by(|a, b| self.nodes[a.0].name.cmp(&self.nodes[b.0].name));
        out
    }

    pub fn depth(&self, id: NodeId) -> u32 {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Number of levels below and including the root.
    pub fn height(&self) -> u32 {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.children.is_empty())
            .map(|(i, _)| self.depth(NodeId(i)) + 1)
            .max()
            .unwrap_or(1)
    }

    /// Ancestors of `id` from the root down, excluding `id`.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            out.push(parent);
            current = parent;
        }
        out.reverse();
        out
    }

    /// The frame directly under the synthetic root that `id` belongs to.
    ///
    /// Stops when the current node's parent has no parent of its own. The
    /// root maps to itself.
    pub fn sampled_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if self.parent(parent).is_none() {
                break;
            }
            current = parent;
        }
        current
    }

    pub fn is_highlighted(&self, id: NodeId) -> bool {
        self.nodes[id.0].highlighted
    }

    /// Highlight every frame whose name contains `term` (case-sensitive).
    pub fn search(&mut self, term: &str) -> SearchSummary {
        for node in &mut self.nodes {
            node.highlighted = !term.is_empty() && node.name.contains(term);
        }

        let matches = self.nodes.iter().filter(|n| n.highlighted).count();
        let matched_value = self.outermost_matches();
        let total = self.value(NodeId::ROOT);
        let percent = if total == 0 {
            0.0
        } else {
            matched_value as f64 / total as f64 * 100.0
        };

        SearchSummary {
            matches,
            matched_value,
            percent,
        }
    }

    fn outermost_matches(&self) -> u64 {
        let mut total = 0u64;
        let mut pending = vec![NodeId::ROOT];
        while let Some(id) = pending.pop() {
            let node = &self.nodes[id.0];
            if node.highlighted {
                total = total.saturating_add(node.value);
            } else {
                pending.extend(node.children.iter().copied());
            }
        }
        total
    }

    pub fn clear_highlight(&mut self) {
        for node in &mut self.nodes {
            node.highlighted = false;
        }
    }

    /// Non-root frames ordered by descending value.
    pub fn hottest(&self, limit: usize) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = (1..self.nodes.len()).map(NodeId).collect();
        ids.sort_by(|a, b| {
            self.nodes[b.0]
                .value
                .cmp(&self.nodes[a.0].value)
                .then_with(|| self.nodes[a.0].name.cmp(&self.nodes[b.0].name))
        });
        ids.truncate(limit);
        ids
    }

    /// Owned copy of the subtree under `id`.
    pub fn to_frame_node(&self, id: NodeId) -> FrameNode {
        let mut preorder = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            preorder.push(current);
            pending.extend(self.nodes[current.0].children.iter().rev().copied());
        }

        // Walking the preorder backwards finishes every child before its
        // parent, with the first child on top of `built`.
        let mut built: Vec<FrameNode> = Vec::new();
        for current in preorder.into_iter().skip(1).rev() {
            let frame = self.frame_from_built(current, &mut built);
            built.push(frame);
        }
        self.frame_from_built(id, &mut built)
    }

    fn frame_from_built(&self, id: NodeId, built: &mut Vec<FrameNode>) -> FrameNode {
        let node = &self.nodes[id.0];
        FrameNode {
            name: node.name.clone(),
            value: node.value,
            children: (0..node.children.len()).filter_map(|_| built.pop()).collect(),
        }
    }
}

impl Default for FlameTree {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(thread: &str, frames: &[&str], value: u64) -> FrameNode {
        let mut node: Option<FrameNode> = None;
        for name in frames.iter().rev() {
            let mut f = FrameNode::new(*name, value);
            if let Some(child) = node.take() {
                f.children.push(child);
            }
            node = Some(f);
        }
        let mut t = FrameNode::new(thread, value);
        t.children.extend(node);
        FrameNode::new("root", value).with_children(vec![t])
    }

    #[test]
    fn merge_adds_values_by_name_and_keeps_root() {
        let mut tree = FlameTree::placeholder();
        tree.merge(&sample("MainThread", &["main", "work"], 10));
        tree.merge(&sample("MainThread", &["main", "idle"], 5));

        assert_eq!(tree.value(NodeId::ROOT), 1 + 10 + 5);
        let thread = tree.child_named(NodeId::ROOT, "MainThread").unwrap();
        assert_eq!(tree.value(thread), 15);
        let main = tree.child_named(thread, "main").unwrap();
        assert_eq!(tree.value(main), 15);
        assert_eq!(tree.children(main).len(), 2);
        assert_eq!(tree.height(), 4);
    }

    #[test]
    fn incoming_root_name_does_not_rename_held_root() {
        let mut tree = FlameTree::placeholder();
        tree.merge(&FrameNode::new("other", 4));
        assert_eq!(tree.name(NodeId::ROOT), "root");
        assert_eq!(tree.value(NodeId::ROOT), 5);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn duplicate_incoming_siblings_collapse() {
        let mut tree = FlameTree::placeholder();
        let incoming = FrameNode::new("root", 6)
            .with_children(vec![FrameNode::new("t", 2), FrameNode::new("t", 4)]);
        tree.merge(&incoming);
        assert_eq!(tree.children(NodeId::ROOT).len(), 1);
        let t = tree.child_named(NodeId::ROOT, "t").unwrap();
        assert_eq!(tree.value(t), 6);
    }

    #[test]
    fn sampled_root_stops_below_synthetic_root() {
        let tree = FlameTree::new(&sample("T1", &["a", "b"], 3));
        let thread = tree.child_named(NodeId::ROOT, "T1").unwrap();
        let a = tree.child_named(thread, "a").unwrap();
        let b = tree.child_named(a, "b").unwrap();

        assert_eq!(tree.sampled_root(b), thread);
        assert_eq!(tree.sampled_root(a), thread);
        assert_eq!(tree.sampled_root(thread), thread);
        assert_eq!(tree.sampled_root(NodeId::ROOT), NodeId::ROOT);
        assert_eq!(tree.ancestors(b), vec![NodeId::ROOT, thread, a]);
        assert_eq!(tree.depth(b), 3);
    }

    #[test]
    fn search_counts_all_matches_but_sums_outermost() {
        let mut tree = FlameTree::placeholder();
        tree.merge(&sample("T", &["load", "load_file"], 40));
        tree.merge(&sample("T", &["run"], 59));

        let summary = tree.search("load");
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.matched_value, 40);
        assert!((summary.percent - 40.0).abs() < 1e-9);

        let t = tree.child_named(NodeId::ROOT, "T").unwrap();
        let run = tree.child_named(t, "run").unwrap();
        assert!(!tree.is_highlighted(run));

        tree.clear_highlight();
        let load = tree.child_named(t, "load").unwrap();
        assert!(!tree.is_highlighted(load));
    }

    #[test]
    fn hottest_skips_root_and_orders_by_value() {
        let mut tree = FlameTree::placeholder();
        tree.merge(&sample("T", &["slow"], 90));
        tree.merge(&sample("T", &["fast"], 10));
        let names: Vec<&str> = tree.hottest(3).into_iter().map(|id| tree.name(id)).collect();
        assert_eq!(names, vec!["T", "slow", "fast"]);
    }

    #[test]
    fn round_trips_to_frame_node() {
        let frame = sample("T", &["x"], 2);
        let tree = FlameTree::new(&frame);
        assert_eq!(tree.to_frame_node(NodeId::ROOT), frame);

        let wide = FrameNode::new("root", 9).with_children(vec![
            FrameNode::new("b", 4).with_children(vec![FrameNode::new("b1", 1), FrameNode::new("b2", 2)]),
            FrameNode::new("a", 5),
        ]);
        let tree = FlameTree::new(&wide);
        assert_eq!(tree.to_frame_node(NodeId::ROOT), wide);
        let b = tree.child_named(NodeId::ROOT, "b").unwrap();
        assert_eq!(tree.to_frame_node(b), wide.children[0]);
    }
}

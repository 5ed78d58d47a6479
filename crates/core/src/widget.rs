//! The flame graph widget and the capability trait the controller drives.

use serde::{Deserialize, Serialize};

use crate::flame::{FlameTree, NodeId, SearchSummary};
use crate::label::{frame_label, percent_of};
use crate::layout::{self, ChildOrder, FrameRect};
use crate::protocol::FrameNode;

/// What the dashboard needs from a flame graph renderer.
///
/// Any substitute visualization has to honour these semantics; in particular
/// `merge` folds into the current root instead of replacing it.
pub trait FlameWidget {
    fn render(&mut self, tree: &FrameNode);
    fn merge(&mut self, partial: &FrameNode);
    fn set_height(&mut self, px: u32);
    fn set_width(&mut self, px: u32);
    fn search(&mut self, term: &str);
    fn clear(&mut self);
    fn reset_zoom(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    Cubic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t.clamp(0.0, 1.0),
            Easing::Cubic => layout::ease_cubic_in_out(t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameGraphConfig {
    pub cell_height: u32,
    pub transition_ms: u32,
    pub easing: Easing,
    /// Order siblings by name; otherwise keep the order they arrived in.
    pub sort: bool,
    pub title: String,
    pub min_frame_size: f64,
}

impl Default for FlameGraphConfig {
    fn default() -> Self {
        Self {
            cell_height: 18,
            transition_ms: 250,
            easing: Easing::Cubic,
            sort: true,
            title: String::new(),
            min_frame_size: 0.0,
        }
    }
}

impl FlameGraphConfig {
    pub fn child_order(&self) -> ChildOrder {
        if self.sort {
            ChildOrder::Name
        } else {
            ChildOrder::Inserted
        }
    }
}

/// Renderer-agnostic flame graph state.
///
/// Holds the merged tree, pixel size, zoom focus and search. A front end
/// reads `frames()` after every change (see `revision`) and paints them.
#[derive(Debug, Clone)]
pub struct FlameGraph {
    config: FlameGraphConfig,
    tree: FlameTree,
    width: u32,
    height: u32,
    focus: NodeId,
    search_term: Option<String>,
    search: Option<SearchSummary>,
    revision: u64,
}

impl FlameGraph {
    pub fn new(config: FlameGraphConfig) -> Self {
        Self {
            config,
            tree: FlameTree::placeholder(),
            width: 0,
            height: 0,
            focus: NodeId::ROOT,
            search_term: None,
            search: None,
            revision: 0,
        }
    }

    pub fn config(&self) -> &FlameGraphConfig {
        &self.config
    }

    pub fn tree(&self) -> &FlameTree {
        &self.tree
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    /// Bumped on every visible change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn search_summary(&self) -> Option<SearchSummary> {
        self.search
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn frames(&self) -> Vec<FrameRect> {
        layout::layout(&self.tree, self.focus, self.config.child_order())
    }

    /// Rows needed to show the whole tree.
    pub fn rows(&self) -> u32 {
        self.tree.height()
    }

    pub fn zoom_to(&mut self, id: NodeId) {
        if self.tree.contains(id) && self.focus != id {
            self.focus = id;
            self.touch();
        }
    }

    pub fn label(&self, id: NodeId) -> String {
        frame_label(&self.tree, id)
    }

    /// Frame at pixel `(x, y)`, `y` measured from the top of the chart.
    pub fn frame_at(&self, x: f64, y: f64) -> Option<NodeId> {
        let cell = f64::from(self.config.cell_height.max(1));
        if self.width == 0 || x < 0.0 || y < 0.0 || y >= f64::from(self.height) {
            return None;
        }
        let row_from_bottom = ((f64::from(self.height) - y) / cell).floor();
        if row_from_bottom < 0.0 {
            return None;
        }
        let frames = self.frames();
        layout::hit_test(&frames, x / f64::from(self.width), row_from_bottom as u32)
    }

    /// Text for the details element: search results while searching,
    /// otherwise the hovered frame's label.
    pub fn details(&self, hovered: Option<NodeId>) -> String {
        if let Some(id) = hovered.filter(|id| self.tree.contains(*id)) {
            return self.label(id);
        }
        match (&self.search_term, self.search) {
            (Some(term), Some(s)) => format!(
                "search \"{term}\": {} matches, {} of {} ({}%)",
                s.matches,
                s.matched_value,
                self.tree.value(NodeId::ROOT),
                percent_of(s.matched_value, self.tree.value(NodeId::ROOT)),
            ),
            _ => String::new(),
        }
    }
}

impl FlameWidget for FlameGraph {
    fn render(&mut self, tree: &FrameNode) {
        self.tree = FlameTree::new(tree);
        self.focus = NodeId::ROOT;
        if let Some(term) = self.search_term.clone() {
            self.search = Some(self.tree.search(&term));
        }
        self.touch();
    }

    fn merge(&mut self, partial: &FrameNode) {
        self.focus = NodeId::ROOT;
        self.tree.merge(partial);
        if let Some(term) = self.search_term.clone() {
            self.search = Some(self.tree.search(&term));
        }
        self.touch();
    }

    fn set_height(&mut self, px: u32) {
        if self.height != px {
            self.height = px;
            self.touch();
        }
    }

    fn set_width(&mut self, px: u32) {
        if self.width != px {
            self.width = px;
            self.touch();
        }
    }

    fn search(&mut self, term: &str) {
        self.search = Some(self.tree.search(term));
        self.search_term = Some(term.to_string());
        self.touch();
    }

    fn clear(&mut self) {
        self.tree.clear_highlight();
        self.search_term = None;
        self.search = None;
        self.touch();
    }

    fn reset_zoom(&mut self) {
        if self.focus != NodeId::ROOT {
            self.focus = NodeId::ROOT;
            self.touch();
        }
    }
}

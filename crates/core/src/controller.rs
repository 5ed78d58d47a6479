use crate::protocol::FrameNode;
use crate::widget::FlameWidget;

/// Drives a [`FlameWidget`] the way the dashboard needs it: rows to pixels,
/// container-sized width, and empty search terms ignored.
#[derive(Debug)]
pub struct FlameGraphController<W> {
    widget: W,
    cell_height: u32,
}

impl<W: FlameWidget> FlameGraphController<W> {
    /// Wrap `widget` and render the placeholder root once.
    pub fn new(mut widget: W, cell_height: u32) -> Self {
        widget.set_height(0);
        widget.render(&FrameNode::placeholder());
        Self {
            widget,
            cell_height,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// `rows` frames tall.
    pub fn set_height(&mut self, rows: u32) {
        self.widget.set_height(rows.saturating_mul(self.cell_height));
    }

    pub fn set_width(&mut self, px: u32) {
        self.widget.set_width(px);
    }

    pub fn on_resize(&mut self, container_width: u32) {
        self.set_width(container_width);
    }

    pub fn merge(&mut self, partial: &FrameNode) {
        self.widget.merge(partial);
    }

    pub fn search(&mut self, term: &str) {
        if term.is_empty() {
            return;
        }
        self.widget.search(term);
    }

    /// Input handler for the search box: emptying it clears the search.
    pub fn on_search_input(&mut self, term: &str) {
        if term.is_empty() {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.widget.clear();
    }

    pub fn reset_zoom(&mut self) {
        self.widget.reset_zoom();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every call made on the widget.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingWidget {
        pub(crate) calls: Vec<String>,
    }

    impl FlameWidget for RecordingWidget {
        fn render(&mut self, tree: &FrameNode) {
            self.calls.push(format!("render {}={}", tree.name, tree.value));
        }
        fn merge(&mut self, partial: &FrameNode) {
            self.calls.push(format!("merge {}={}", partial.name, partial.value));
        }
        fn set_height(&mut self, px: u32) {
            self.calls.push(format!("height {px}"));
        }
        fn set_width(&mut self, px: u32) {
            self.calls.push(format!("width {px}"));
        }
        fn search(&mut self, term: &str) {
            self.calls.push(format!("search {term}"));
        }
        fn clear(&mut self) {
            self.calls.push("clear".to_string());
        }
        fn reset_zoom(&mut self) {
            self.calls.push("reset_zoom".to_string());
        }
    }

    #[test]
    fn renders_placeholder_once_on_construction() {
        let c = FlameGraphController::new(RecordingWidget::default(), 18);
        assert_eq!(c.widget().calls, vec!["height 0", "render root=1"]);
    }

    #[test]
    fn height_is_rows_times_cell_height() {
        let mut c = FlameGraphController::new(RecordingWidget::default(), 18);
        c.set_height(4);
        c.on_resize(640);
        assert_eq!(c.widget().calls[2..], ["height 72", "width 640"]);
    }

    #[test]
    fn empty_search_is_a_no_op_and_empty_input_clears() {
        let mut c = FlameGraphController::new(RecordingWidget::default(), 18);
        c.search("");
        c.on_search_input("ma");
        assert_eq!(c.widget().calls.len(), 2);

        c.search("main");
        c.on_search_input("");
        c.reset_zoom();
        assert_eq!(c.widget().calls[2..], ["search main", "clear", "reset_zoom"]);
    }
}

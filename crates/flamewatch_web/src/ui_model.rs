//! UI inventory that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! page layout contract on the host.

use flamewatch::status::StatusField;

/// Font used for frame labels on the chart canvas.
pub const FRAME_FONT: &str = "12px Verdana, sans-serif";
/// Fallback glyph width when the canvas cannot measure text.
pub const FRAME_CHAR_PX: f64 = 7.0;

/// Elements the dashboard page is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementId {
    Status,
    Duration,
    Samples,
    Cpu,
    Memory,
    Pid,
    Command,
    Chart,
    Details,
    Form,
    Term,
}

impl ElementId {
    pub fn id(self) -> &'static str {
        match self {
            ElementId::Status => "status",
            ElementId::Duration => "duration",
            ElementId::Samples => "samples",
            ElementId::Cpu => "cpu",
            ElementId::Memory => "memory",
            ElementId::Pid => "pid",
            ElementId::Command => "command",
            ElementId::Chart => "chart",
            ElementId::Details => "details",
            ElementId::Form => "form",
            ElementId::Term => "term",
        }
    }

    pub fn for_field(field: StatusField) -> Self {
        match field {
            StatusField::Duration => ElementId::Duration,
            StatusField::Samples => ElementId::Samples,
            StatusField::Cpu => ElementId::Cpu,
            StatusField::Memory => ElementId::Memory,
            StatusField::Pid => ElementId::Pid,
            StatusField::Command => ElementId::Command,
        }
    }

    pub fn all() -> &'static [ElementId] {
        &[
            ElementId::Status,
            ElementId::Duration,
            ElementId::Samples,
            ElementId::Cpu,
            ElementId::Memory,
            ElementId::Pid,
            ElementId::Command,
            ElementId::Chart,
            ElementId::Details,
            ElementId::Form,
            ElementId::Term,
        ]
    }
}

/// Toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    PlayPause,
    ResetZoom,
    Clear,
}

impl ToolbarAction {
    pub fn title(self) -> &'static str {
        match self {
            ToolbarAction::PlayPause => "Pause or resume sampling",
            ToolbarAction::ResetZoom => "Reset zoom",
            ToolbarAction::Clear => "Clear search",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolbarAction::PlayPause => "",
            ToolbarAction::ResetZoom => "Reset",
            ToolbarAction::Clear => "Clear",
        }
    }

    pub fn all() -> &'static [ToolbarAction] {
        &[
            ToolbarAction::PlayPause,
            ToolbarAction::ResetZoom,
            ToolbarAction::Clear,
        ]
    }
}

/// Inline style length for a pixel extent.
pub fn css_px(px: u32) -> String {
    format!("{px}px")
}

/// Map a pointer position in CSS px to backing-store px.
pub fn to_backing_px(css: f64, css_extent: f64, backing_extent: u32) -> f64 {
    if css_extent <= 0.0 {
        return css;
    }
    css * f64::from(backing_extent) / css_extent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_inventory_is_stable() {
        let all = ElementId::all();
        assert_eq!(all.len(), 11);

        let mut ids: Vec<&'static str> = all.iter().copied().map(ElementId::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn status_fields_map_to_their_elements() {
        for field in StatusField::all() {
            assert_eq!(ElementId::for_field(*field).id(), field.element_id());
        }
    }

    #[test]
    fn toolbar_actions_have_titles() {
        for action in ToolbarAction::all() {
            assert!(!action.title().trim().is_empty());
        }
    }

    #[test]
    fn backing_px_scales_with_canvas() {
        assert_eq!(to_backing_px(50.0, 100.0, 200), 100.0);
        assert_eq!(to_backing_px(50.0, 0.0, 200), 50.0);
    }

    #[test]
    fn style_lengths_follow_cell_rows() {
        assert_eq!(css_px(3 * 18), "54px");
        assert_eq!(css_px(0), "0px");
    }
}

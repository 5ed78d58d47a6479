use crate::clock::format_hhmmss;
use crate::flame::{FlameTree, NodeId};
use crate::float_fmt::fmt_f64_fixed;

pub const CLOCK_GLYPH: &str = "🕘";

/// Producer values are divided by this before being shown as `HH:MM:SS`.
///
/// Values are nanoseconds, so this reads microseconds as seconds. Kept as the
/// dashboard has always rendered it.
pub const VALUE_TO_SECONDS: u64 = 1_000_000;

/// Hover text for a frame: name, elapsed time, share of its sampled root.
pub fn frame_label(tree: &FlameTree, id: NodeId) -> String {
    let anchor = tree.sampled_root(id);
    let value = tree.value(id);
    format!(
        "{} {} {} ({}%)",
        tree.name(id),
        CLOCK_GLYPH,
        format_hhmmss(value / VALUE_TO_SECONDS),
        percent_of(value, tree.value(anchor)),
    )
}

/// `value / total * 100` with two decimals; `0 / 0` reads `NaN`.
pub fn percent_of(value: u64, total: u64) -> String {
    fmt_f64_fixed(value as f64 / total as f64 * 100.0, 2)
}

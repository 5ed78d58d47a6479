//! Icicle layout, transitions and paint helpers for the flame graph.
//!
//! Horizontal positions are fractions of the chart width in `[0, 1]`; depth
//! counts rows up from the root, which sits on the bottom row.

use std::collections::HashMap;

use crate::flame::{FlameTree, NodeId};

/// Fill used for frames matching the active search.
pub const HIGHLIGHT_COLOR: &str = "#E600E6";

/// Frames narrower than this (in px) get no text.
pub const MIN_LABELLED_WIDTH_PX: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRect {
    pub id: NodeId,
    pub depth: u32,
    pub x0: f64,
    pub x1: f64,
    /// Ancestors of the zoom focus are drawn faded.
    pub faded: bool,
}

impl FrameRect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
}

/// Sibling order within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildOrder {
    /// Alphabetical by frame name.
    #[default]
    Name,
    /// The order frames first arrived in.
    Inserted,
}

/// Lay out the tree zoomed on `focus` (`NodeId::ROOT` for no zoom).
///
/// The focus and its ancestors span the whole width. Below the focus each
/// child gets `value / max(parent.value, sum(children))` of its parent's
/// span, so oversized children are squeezed to fit. Frames come out in
/// preorder.
pub fn layout(tree: &FlameTree, focus: NodeId, order: ChildOrder) -> Vec<FrameRect> {
    let focus = if tree.contains(focus) {
        focus
    } else {
        NodeId::ROOT
    };

    let mut out = Vec::with_capacity(tree.len());
    for (depth, id) in tree.ancestors(focus).into_iter().enumerate() {
        out.push(FrameRect {
            id,
            depth: depth as u32,
            x0: 0.0,
            x1: 1.0,
            faded: true,
        });
    }

    let mut pending = vec![FrameRect {
        id: focus,
        depth: tree.depth(focus),
        x0: 0.0,
        x1: 1.0,
        faded: false,
    }];
    while let Some(rect) = pending.pop() {
        out.push(rect);
        let start = pending.len();
        place_children(tree, &rect, order, &mut pending);
        // Popped last-in first, so flip to keep the first child next.
        pending[start..].reverse();
    }
    out
}

fn place_children(tree: &FlameTree, parent: &FrameRect, order: ChildOrder, out: &mut Vec<FrameRect>) {
    let children = match order {
        ChildOrder::Name => tree.sorted_children(parent.id),
        ChildOrder::Inserted => tree.children(parent.id).to_vec(),
    };
    if children.is_empty() {
        return;
    }

    let child_sum = children
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(tree.value(*c)));
    let denom = tree.value(parent.id).max(child_sum);
    if denom == 0 {
        return;
    }

    let span = parent.x1 - parent.x0;
    let mut cursor = parent.x0;
    for child in children {
        let w = span * tree.value(child) as f64 / denom as f64;
        out.push(FrameRect {
            id: child,
            depth: parent.depth + 1,
            x0: cursor,
            x1: cursor + w,
            faded: false,
        });
        cursor += w;
    }
}

/// Frame under a point, with `row` counted from the bottom.
pub fn hit_test(frames: &[FrameRect], x_frac: f64, row: u32) -> Option<NodeId> {
    frames
        .iter()
        .find(|f| f.depth == row && x_frac >= f.x0 && x_frac < f.x1)
        .map(|f| f.id)
}

/// d3's `easeCubicInOut`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Blend two layouts at eased progress `t`.
///
/// Frames present in both move between their old and new extents; new
/// frames grow from their final left edge.
pub fn interpolate(from: &[FrameRect], to: &[FrameRect], t: f64) -> Vec<FrameRect> {
    let previous: HashMap<NodeId, &FrameRect> = from.iter().map(|f| (f.id, f)).collect();
    let lerp = |a: f64, b: f64| a + (b - a) * t;

    to.iter()
        .map(|next| {
            let (x0, x1) = match previous.get(&next.id) {
                Some(prev) => (lerp(prev.x0, next.x0), lerp(prev.x1, next.x1)),
                None => (next.x0, lerp(next.x0, next.x1)),
            };
            FrameRect { x0, x1, ..*next }
        })
        .collect()
}

/// d3-flame-graph's name hash: weighted char codes of the first 7 chars, in `[0, 1]`.
pub fn name_hash(name: &str) -> f64 {
    const MOD: u32 = 10;
    const MAX_CHAR: usize = 6;

    let mut hash = 0.0;
    let mut max_hash = 0.0;
    let mut weight = 1.0;
    for (i, unit) in name.encode_utf16().enumerate() {
        if i > MAX_CHAR {
            break;
        }
        hash += weight * f64::from(u32::from(unit) % MOD);
        max_hash += weight * f64::from(MOD - 1);
        weight *= 0.70;
    }
    if max_hash > 0.0 {
        hash / max_hash
    } else {
        hash
    }
}

/// Warm palette colour for a frame name.
pub fn frame_color(name: &str) -> (u8, u8, u8) {
    let v = name_hash(name);
    let r = 200.0 + (55.0 * v).round();
    let g = (230.0 * (1.0 - v)).round();
    let b = (55.0 * (1.0 - v)).round();
    (r as u8, g as u8, b as u8)
}

pub fn css_rgb((r, g, b): (u8, u8, u8)) -> String {
    format!("rgb({r},{g},{b})")
}

/// Name text that fits in `width_px`, or `None` for narrow frames.
pub fn fit_label(name: &str, width_px: f64, char_px: f64) -> Option<String> {
    if width_px < MIN_LABELLED_WIDTH_PX || char_px <= 0.0 {
        return None;
    }
    let max_chars = ((width_px - 6.0) / char_px).floor().max(0.0) as usize;
    let count = name.chars().count();
    if count <= max_chars {
        return Some(name.to_string());
    }
    if max_chars < 3 {
        return None;
    }
    let mut out: String = name.chars().take(max_chars - 2).collect();
    out.push_str("..");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrameNode;

    fn tree() -> FlameTree {
        // root(100) -> a(60) -> a1(30), b(40)
        FlameTree::new(&FrameNode::new("root", 100).with_children(vec![
            FrameNode::new("b", 40),
            FrameNode::new("a", 60).with_children(vec![FrameNode::new("a1", 30)]),
        ]))
    }

    fn rect_of(frames: &[FrameRect], tree: &FlameTree, name: &str) -> FrameRect {
        *frames
            .iter()
            .find(|f| tree.name(f.id) == name)
            .unwrap_or_else(|| panic!("missing frame {name}"))
    }

    #[test]
    fn children_are_sorted_and_proportional() {
        let t = tree();
        let frames = layout(&t, NodeId::ROOT, ChildOrder::Name);
        assert_eq!(frames.len(), 4);

        let a = rect_of(&frames, &t, "a");
        let b = rect_of(&frames, &t, "b");
        let a1 = rect_of(&frames, &t, "a1");
        assert_eq!((a.x0, a.x1), (0.0, 0.6));
        assert!((b.x0 - 0.6).abs() < 1e-12 && (b.x1 - 1.0).abs() < 1e-12);
        assert_eq!(a1.depth, 2);
        assert!((a1.width() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn inserted_order_keeps_arrival_order() {
        let t = FlameTree::new(&FrameNode::new("root", 2).with_children(vec![
            FrameNode::new("z", 1),
            FrameNode::new("a", 1),
        ]));
        fn names(t: &FlameTree, order: ChildOrder) -> Vec<&str> {
            layout(t, NodeId::ROOT, order).iter().map(|f| t.name(f.id)).collect()
        }
        assert_eq!(names(&t, ChildOrder::Inserted), vec!["root", "z", "a"]);
        assert_eq!(names(&t, ChildOrder::Name), vec!["root", "a", "z"]);

        let frames = layout(&t, NodeId::ROOT, ChildOrder::Inserted);
        assert_eq!(rect_of(&frames, &t, "z").x0, 0.0);
        assert_eq!(rect_of(&frames, &t, "a").x0, 0.5);
    }

    #[test]
    fn deep_chains_lay_out_every_row() {
        let mut chain = FrameNode::new("f999", 1);
        for i in (0..999).rev() {
            chain = FrameNode::new(format!("f{i}"), 1).with_children(vec![chain]);
        }
        let t = FlameTree::new(&FrameNode::new("root", 1).with_children(vec![chain]));
        let frames = layout(&t, NodeId::ROOT, ChildOrder::Name);
        assert_eq!(frames.len(), 1001);
        assert_eq!(frames.last().map(|f| f.depth), Some(1000));
        assert!(frames.iter().all(|f| f.x0 == 0.0 && f.x1 == 1.0));
    }

    #[test]
    fn oversized_children_are_squeezed_into_parent() {
        let t = FlameTree::new(&FrameNode::new("root", 1).with_children(vec![
            FrameNode::new("x", 30),
            FrameNode::new("y", 10),
        ]));
        let frames = layout(&t, NodeId::ROOT, ChildOrder::Name);
        let y = rect_of(&frames, &t, "y");
        assert!((y.x1 - 1.0).abs() < 1e-12);
        assert!(frames.iter().all(|f| f.x1 <= 1.0 + 1e-12));
    }

    #[test]
    fn zoom_spans_focus_and_hides_siblings() {
        let t = tree();
        let a = t.child_named(NodeId::ROOT, "a").unwrap();
        let frames = layout(&t, a, ChildOrder::Name);

        assert!(frames.iter().all(|f| t.name(f.id) != "b"));
        let root = rect_of(&frames, &t, "root");
        assert!(root.faded);
        let focus = rect_of(&frames, &t, "a");
        assert_eq!((focus.x0, focus.x1, focus.faded), (0.0, 1.0, false));
        let a1 = rect_of(&frames, &t, "a1");
        assert!((a1.width() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn hit_test_matches_row_and_span() {
        let t = tree();
        let frames = layout(&t, NodeId::ROOT, ChildOrder::Name);
        assert_eq!(hit_test(&frames, 0.7, 1).map(|id| t.name(id)), Some("b"));
        assert_eq!(hit_test(&frames, 0.1, 2).map(|id| t.name(id)), Some("a1"));
        assert_eq!(hit_test(&frames, 0.9, 2), None);
        assert_eq!(hit_test(&frames, 0.5, 7), None);
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!(ease_cubic_in_out(0.25) < 0.25);
    }

    #[test]
    fn interpolation_grows_new_frames_from_left_edge() {
        let t = tree();
        let after = layout(&t, NodeId::ROOT, ChildOrder::Name);
        let before: Vec<FrameRect> = after
            .iter()
            .filter(|f| t.name(f.id) != "a1")
            .copied()
            .collect();

        let start = interpolate(&before, &after, 0.0);
        let a1 = rect_of(&start, &t, "a1");
        assert_eq!(a1.x0, a1.x1);
        assert_eq!(interpolate(&before, &after, 1.0), after);
    }

    #[test]
    fn palette_is_warm_and_stable() {
        assert_eq!(name_hash(""), 0.0);
        let (r, g, b) = frame_color("main (app.py)");
        assert!(r >= 200);
        assert_eq!(frame_color("main (app.py)"), (r, g, b));
        assert!(css_rgb((1, 2, 3)) == "rgb(1,2,3)");
    }

    #[test]
    fn labels_fit_or_truncate() {
        assert_eq!(fit_label("main", 20.0, 7.0), None);
        assert_eq!(fit_label("main", 100.0, 7.0), Some("main".to_string()));
        assert_eq!(
            fit_label("very_long_function_name", 62.0, 7.0),
            Some("very_l..".to_string())
        );
    }
}

use flamewatch::flame::NodeId;
use flamewatch::layout::{css_rgb, fit_label, frame_color, FrameRect, HIGHLIGHT_COLOR};
use flamewatch::widget::FlameGraph;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::ui_model::{css_px, FRAME_CHAR_PX, FRAME_FONT};

const BACKGROUND: &str = "#ffffff";
const FRAME_TEXT: &str = "#000000";
const FRAME_BORDER: &str = "#ffffff";
const HOVER_BORDER: &str = "#1f2937";

fn context_2d(
    canvas: &web_sys::HtmlCanvasElement,
) -> Result<web_sys::CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())
}

/// Match the element's CSS box to the graph's pixel size, and the backing
/// store too when it changed (resizing it clears the canvas).
pub(super) fn sync_size(canvas: &web_sys::HtmlCanvasElement, graph: &FlameGraph) -> Result<(), String> {
    let style = canvas.style();
    style
        .set_property("width", &css_px(graph.width()))
        .map_err(|_| "canvas: cannot set style width".to_string())?;
    style
        .set_property("height", &css_px(graph.height()))
        .map_err(|_| "canvas: cannot set style height".to_string())?;

    if canvas.width() != graph.width() {
        canvas.set_width(graph.width());
    }
    if canvas.height() != graph.height() {
        canvas.set_height(graph.height());
    }
    Ok(())
}

/// Paint `frames` with the root on the bottom row.
#[allow(deprecated)]
pub(super) fn draw_flame_graph(
    canvas: &web_sys::HtmlCanvasElement,
    graph: &FlameGraph,
    frames: &[FrameRect],
    hovered: Option<NodeId>,
) -> Result<(), String> {
    sync_size(canvas, graph)?;
    let ctx = context_2d(canvas)?;

    let w = f64::from(canvas.width());
    let h = f64::from(canvas.height());
    let cell = f64::from(graph.config().cell_height.max(1));
    let min_px = graph.config().min_frame_size;

    ctx.set_fill_style(&JsValue::from_str(BACKGROUND));
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.set_font(FRAME_FONT);
    ctx.set_text_baseline("middle");
    let char_px = ctx
        .measure_text("M")
        .map(|m| m.width())
        .ok()
        .filter(|px| *px > 0.0)
        .unwrap_or(FRAME_CHAR_PX);

    let tree = graph.tree();
    for frame in frames {
        let x = frame.x0 * w;
        let fw = frame.width() * w;
        if fw <= min_px || fw <= 0.0 {
            continue;
        }
        let y = h - f64::from(frame.depth + 1) * cell;
        if y + cell < 0.0 {
            continue;
        }

        let name = tree.name(frame.id);
        let fill = if tree.is_highlighted(frame.id) {
            HIGHLIGHT_COLOR.to_string()
        } else {
            css_rgb(frame_color(name))
        };

        ctx.set_global_alpha(if frame.faded { 0.6 } else { 1.0 });
        ctx.set_fill_style(&JsValue::from_str(&fill));
        ctx.fill_rect(x, y, fw, cell);
        ctx.set_stroke_style(&JsValue::from_str(FRAME_BORDER));
        ctx.set_line_width(1.0);
        ctx.stroke_rect(x, y, fw, cell);

        if let Some(text) = fit_label(name, fw, char_px) {
            ctx.set_fill_style(&JsValue::from_str(FRAME_TEXT));
            let _ = ctx.fill_text(&text, x + 3.0, y + cell / 2.0);
        }
    }
    ctx.set_global_alpha(1.0);

    if let Some(frame) = hovered.and_then(|id| frames.iter().find(|f| f.id == id)) {
        let y = h - f64::from(frame.depth + 1) * cell;
        ctx.set_stroke_style(&JsValue::from_str(HOVER_BORDER));
        ctx.set_line_width(2.0);
        ctx.stroke_rect(frame.x0 * w + 1.0, y + 1.0, frame.width() * w - 2.0, cell - 2.0);
    }

    if !graph.config().title.is_empty() {
        ctx.set_fill_style(&JsValue::from_str(FRAME_TEXT));
        ctx.set_text_baseline("top");
        let _ = ctx.fill_text(&graph.config().title, 4.0, 4.0);
    }

    Ok(())
}

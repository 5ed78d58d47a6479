use std::cell::Cell;
use std::rc::Rc;

use flamewatch::layout::{interpolate, FrameRect};
use flamewatch::widget::Easing;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// One layout-to-layout move, driven by `requestAnimationFrame`.
struct Transition {
    id: u64,
    generation: Rc<Cell<u64>>,
    from: Vec<FrameRect>,
    to: Vec<FrameRect>,
    started_ms: f64,
    duration_ms: f64,
    easing: Easing,
    paint: Rc<dyn Fn(&[FrameRect])>,
}

/// Animate from `from` to `to`, painting every frame. Starting a new
/// transition on the same `generation` cancels the running one.
pub(super) fn animate(
    generation: Rc<Cell<u64>>,
    from: Vec<FrameRect>,
    to: Vec<FrameRect>,
    duration_ms: u32,
    easing: Easing,
    paint: Rc<dyn Fn(&[FrameRect])>,
) {
    let id = generation.get().wrapping_add(1);
    generation.set(id);

    if duration_ms == 0 || from.is_empty() {
        paint(&to);
        return;
    }

    schedule(Rc::new(Transition {
        id,
        generation,
        from,
        to,
        started_ms: js_sys::Date::now(),
        duration_ms: f64::from(duration_ms),
        easing,
        paint,
    }));
}

fn schedule(transition: Rc<Transition>) {
    let Some(window) = web_sys::window() else {
        (transition.paint)(&transition.to);
        return;
    };
    let cb = Closure::once_into_js(move || step(transition));
    let _ = window.request_animation_frame(cb.unchecked_ref());
}

fn step(transition: Rc<Transition>) {
    if transition.generation.get() != transition.id {
        return;
    }
    let progress = (js_sys::Date::now() - transition.started_ms) / transition.duration_ms;
    if progress >= 1.0 {
        (transition.paint)(&transition.to);
        return;
    }
    let t = transition.easing.apply(progress);
    (transition.paint)(&interpolate(&transition.from, &transition.to, t));
    schedule(transition);
}

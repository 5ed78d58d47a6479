use std::collections::HashMap;
use std::rc::Rc;

use flamewatch::clock;
use flamewatch::session::{HostError, SessionHost, TimerHandle, TimerKind};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use super::socket::BrowserSocket;
use crate::ui_model::ElementId;

/// `SessionHost` backed by the page: socket writes, `setInterval`, and the
/// chart container's width.
pub(super) struct BrowserHost {
    socket: BrowserSocket,
    on_timer: Rc<dyn Fn(TimerKind)>,
    // Interval callbacks stay alive until cleared.
    timers: HashMap<i32, Closure<dyn FnMut()>>,
}

impl BrowserHost {
    pub(super) fn new(socket: BrowserSocket, on_timer: Rc<dyn Fn(TimerKind)>) -> Self {
        Self {
            socket,
            on_timer,
            timers: HashMap::new(),
        }
    }
}

impl SessionHost for BrowserHost {
    fn send(&mut self, text: &str) -> Result<(), HostError> {
        self.socket.send(text).map_err(HostError::Send)
    }

    fn set_interval(&mut self, kind: TimerKind, period_ms: u32) -> Result<TimerHandle, HostError> {
        let window = web_sys::window().ok_or_else(|| HostError::Timer("no window".to_string()))?;
        let on_timer = self.on_timer.clone();
        let cb = Closure::wrap(Box::new(move || on_timer(kind)) as Box<dyn FnMut()>);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                i32::try_from(period_ms).unwrap_or(i32::MAX),
            )
            .map_err(|err| HostError::Timer(format!("{err:?}")))?;
        self.timers.insert(id, cb);
        Ok(TimerHandle(id))
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        if let Some(w) = web_sys::window() {
            w.clear_interval_with_handle(handle.0);
        }
        self.timers.remove(&handle.0);
    }

    fn container_width(&self) -> u32 {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(ElementId::Chart.id()))
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
            .map(|el| el.offset_width().max(0) as u32)
            .unwrap_or(0)
    }

    fn now_ms(&self) -> u64 {
        clock::now_ms()
    }
}

impl Drop for BrowserHost {
    fn drop(&mut self) {
        if let Some(w) = web_sys::window() {
            for id in self.timers.keys() {
                w.clear_interval_with_handle(*id);
            }
        }
    }
}

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};

#[derive(Debug, Clone)]
pub(super) enum SocketEvent {
    Open,
    Message(String),
    Error(String),
    Closed,
}

/// A producer socket plus the JS callbacks keeping it wired to `on_event`.
pub(super) struct BrowserSocket {
    ws: WebSocket,
    closing: Rc<Cell<bool>>,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(ErrorEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl BrowserSocket {
    pub(super) fn connect(url: &str, on_event: Rc<dyn Fn(SocketEvent)>) -> Result<Self, String> {
        let ws = WebSocket::new(url).map_err(|err| format!("websocket open failed: {err:?}"))?;
        let closing = Rc::new(Cell::new(false));

        let emit = on_event.clone();
        let on_open = Closure::wrap(Box::new(move |_e: Event| {
            emit(SocketEvent::Open);
        }) as Box<dyn FnMut(Event)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let emit = on_event.clone();
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            let Ok(text) = e.data().dyn_into::<js_sys::JsString>() else {
                return;
            };
            emit(SocketEvent::Message(text.as_string().unwrap_or_default()));
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let emit = on_event.clone();
        let on_error = Closure::wrap(Box::new(move |e: ErrorEvent| {
            emit(SocketEvent::Error(e.message()));
        }) as Box<dyn FnMut(ErrorEvent)>);
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let emit = on_event;
        let closing_for_close = closing.clone();
        let on_close = Closure::wrap(Box::new(move |_e: CloseEvent| {
            if closing_for_close.get() {
                return;
            }
            emit(SocketEvent::Closed);
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            closing,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        })
    }

    pub(super) fn send(&self, text: &str) -> Result<(), String> {
        self.ws
            .send_with_str(text)
            .map_err(|err| format!("{err:?}"))
    }
}

impl Drop for BrowserSocket {
    fn drop(&mut self) {
        self.closing.set(true);
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
    }
}

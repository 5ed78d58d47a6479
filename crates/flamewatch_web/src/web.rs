use std::cell::{Cell, RefCell};
use std::rc::Rc;

use flamewatch::config::DashboardConfig;
use flamewatch::flame::NodeId;
use flamewatch::layout::FrameRect;
use flamewatch::location::PageLocation;
use flamewatch::session::{Session, TimerKind};
use flamewatch::status::StatusBar;
use flamewatch::widget::FlameGraph;
use leptos::{ev, html, prelude::*};
use tracing::{error, info, warn};

mod animation;
mod canvas;
mod console;
mod host;
mod socket;
mod status_bar;

use host::BrowserHost;
use socket::{BrowserSocket, SocketEvent};
use status_bar::{Header, ProcessFields, SearchForm};

use crate::ui_model::{to_backing_px, ElementId};

type DashboardSession = Session<BrowserHost, FlameGraph>;
type SessionSlot = StoredValue<Option<DashboardSession>, LocalStorage>;

pub fn start() {
    console::init();
    mount_to_body(|| view! { <App /> });
}

fn update_session<R>(slot: SessionSlot, f: impl FnOnce(&mut DashboardSession) -> R) -> Option<R> {
    slot.try_update_value(|s| s.as_mut().map(f)).flatten()
}

/// Socket URL for the page this app was served from.
fn page_socket_url(config: &DashboardConfig) -> Result<String, String> {
    let location = web_sys::window().ok_or("no window")?.location();
    let read = |r: Result<String, wasm_bindgen::JsValue>| r.map_err(|e| format!("location: {e:?}"));
    let page = PageLocation::from_parts(
        &read(location.protocol())?,
        &read(location.host())?,
        &read(location.pathname())?,
    );
    Ok(page.socket_url(&config.socket_path_suffix))
}

#[component]
fn App() -> impl IntoView {
    let config = DashboardConfig::default();
    let session: SessionSlot = StoredValue::new_local(None);

    let (status, set_status) = signal(StatusBar::default());
    let (revision, set_revision) = signal(0u64);
    let (system_error, set_system_error) = signal(None::<String>);
    let hovered = RwSignal::new(None::<NodeId>);
    let canvas_ref = NodeRef::<html::Canvas>::new();

    // Copy session state into the signals the view reads.
    let publish = move || {
        let snapshot = session.with_value(|s| {
            s.as_ref()
                .map(|s| (s.status().clone(), s.flame().widget().revision()))
        });
        if let Some((bar, rev)) = snapshot {
            set_status.set(bar);
            set_revision.set(rev);
        }
    };

    let on_socket: Rc<dyn Fn(SocketEvent)> = Rc::new(move |event| {
        let outcome = update_session(session, |s| match event {
            SocketEvent::Open => s.on_open(),
            SocketEvent::Message(text) => s.on_message(&text).map(|_| ()),
            SocketEvent::Error(message) => {
                warn!(%message, "socket error");
                Ok(())
            }
            SocketEvent::Closed => {
                s.on_close();
                Ok(())
            }
        });
        if let Some(Err(err)) = outcome {
            warn!(error = %err, "socket event not handled");
        }
        publish();
    });

    let on_timer: Rc<dyn Fn(TimerKind)> = Rc::new(move |kind| {
        if let Some(Err(err)) = update_session(session, |s| s.on_timer(kind)) {
            warn!(error = %err, ?kind, "timer tick failed");
        }
        publish();
    });

    let connect = {
        let config = config.clone();
        move || -> Result<(), String> {
            let url = page_socket_url(&config)?;
            info!(%url, "connecting");
            let socket = BrowserSocket::connect(&url, on_socket)?;
            let host = BrowserHost::new(socket, on_timer);
            let mut s = Session::new(host, FlameGraph::new(config.flame.clone()), config);
            s.start().map_err(|e| e.to_string())?;
            session.set_value(Some(s));
            Ok(())
        }
    };
    if let Err(e) = connect() {
        error!(error = %e, "dashboard failed to start");
        set_system_error.set(Some(e));
    }
    publish();

    let resize = window_event_listener(ev::resize, move |_| {
        update_session(session, |s| s.on_resize());
        publish();
    });

    on_cleanup(move || {
        resize.remove();
        update_session(session, |s| s.shutdown());
        session.set_value(None);
    });

    // Size the chart once it is mounted.
    Effect::new(move |_| {
        if canvas_ref.get().is_some() {
            update_session(session, |s| s.on_resize());
            publish();
        }
    });

    // Paint on every graph change; animate layout changes, repaint hover changes.
    let generation = Rc::new(Cell::new(0u64));
    let shown = Rc::new(RefCell::new(Vec::<FrameRect>::new()));
    let painted_revision = Rc::new(Cell::new(u64::MAX));
    Effect::new(move |_| {
        let rev = revision.get();
        let hovered_id = hovered.get();
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let Some((target, transition_ms, easing)) = session.with_value(|s| {
            s.as_ref().map(|s| {
                let graph = s.flame().widget();
                (graph.frames(), graph.config().transition_ms, graph.config().easing)
            })
        }) else {
            return;
        };

        let paint: Rc<dyn Fn(&[FrameRect])> = {
            let shown = shown.clone();
            Rc::new(move |frames: &[FrameRect]| {
                session.with_value(|s| {
                    if let Some(s) = s {
                        if let Err(e) =
                            canvas::draw_flame_graph(&canvas, s.flame().widget(), frames, hovered_id)
                        {
                            warn!(error = %e, "flame graph draw failed");
                        }
                    }
                });
                *shown.borrow_mut() = frames.to_vec();
            })
        };

        if painted_revision.replace(rev) == rev {
            paint(&target);
            return;
        }
        let from = shown.borrow().clone();
        animation::animate(generation.clone(), from, target, transition_ms, easing, paint);
    });

    let pointer_frame = move |ev: &web_sys::MouseEvent| -> Option<NodeId> {
        let canvas = canvas_ref.get_untracked()?;
        let x = to_backing_px(f64::from(ev.offset_x()), f64::from(canvas.client_width()), canvas.width());
        let y = to_backing_px(f64::from(ev.offset_y()), f64::from(canvas.client_height()), canvas.height());
        session.with_value(|s| s.as_ref().and_then(|s| s.flame().widget().frame_at(x, y)))
    };

    let on_toggle = Callback::new(move |()| {
        match update_session(session, |s| s.toggle_play()) {
            Some(Ok(false)) => info!("play/pause ignored until the connection opens"),
            Some(Err(err)) => warn!(error = %err, "play/pause failed"),
            _ => {}
        }
        publish();
    });
    let on_reset_zoom = Callback::new(move |()| {
        update_session(session, |s| s.reset_zoom());
        publish();
    });
    let on_search = Callback::new(move |term: String| {
        update_session(session, |s| s.search(&term));
        publish();
    });
    let on_input = Callback::new(move |term: String| {
        update_session(session, |s| s.on_search_input(&term));
        publish();
    });
    let on_clear = Callback::new(move |()| {
        update_session(session, |s| s.clear());
        publish();
    });

    let details = move || {
        let _ = revision.get();
        let h = hovered.get();
        session.with_value(|s| {
            s.as_ref()
                .map(|s| s.flame().widget().details(h))
                .unwrap_or_default()
        })
    };

    view! {
        <main class="dashboard">
            <Header status=status on_toggle=on_toggle on_reset_zoom=on_reset_zoom />

            <Show when=move || system_error.get().is_some()>
                <div class="error-banner">
                    <div style="display:flex; gap: 10px; align-items: center; justify-content: space-between;">
                        <div style="font-weight: 600;">"Error"</div>
                        <button on:click=move |_| set_system_error.set(None)>"Dismiss"</button>
                    </div>
                    <div class="mono">{move || system_error.get().unwrap_or_default()}</div>
                </div>
            </Show>

            <ProcessFields status=status />
            <SearchForm on_search=on_search on_input=on_input on_clear=on_clear />

            <div id=ElementId::Chart.id() class="chart">
                <canvas
                    node_ref=canvas_ref
                    on:mousemove=move |ev| hovered.set(pointer_frame(&ev))
                    on:mouseleave=move |_| hovered.set(None)
                    on:click=move |ev| {
                        if let Some(id) = pointer_frame(&ev) {
                            update_session(session, |s| s.flame_mut().widget_mut().zoom_to(id));
                            publish();
                        }
                    }
                ></canvas>
            </div>
            <div id=ElementId::Details.id() class="details mono">{details}</div>
        </main>
    }
}

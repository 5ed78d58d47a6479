//! One dashboard connection: socket state, timers, status bar and flame graph.
//!
//! A `Session` is created per page load and torn down with `shutdown()`. The
//! environment (socket writes, interval timers, container size, wall clock)
//! is reached through [`SessionHost`], so the same state machine runs in the
//! browser and in the native client.

use thiserror::Error;
use tracing::{debug, info};

use crate::clock::DurationTicker;
use crate::config::DashboardConfig;
use crate::controller::FlameGraphController;
use crate::protocol::{self, Message, ProtocolError, DATA_REQUEST};
use crate::status::{PlayIcon, StatusBar, StatusColor};
use crate::widget::FlameWidget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    /// Terminal; there is no reconnect.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Duration,
    DataPoll,
}

/// Opaque id returned by [`SessionHost::set_interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub i32);

#[derive(Debug, Error)]
pub enum HostError {
    #[error("socket send failed: {0}")]
    Send(String),
    #[error("timer setup failed: {0}")]
    Timer(String),
}

pub trait SessionHost {
    fn send(&mut self, text: &str) -> Result<(), HostError>;
    /// Call back with `kind` every `period_ms` until cleared.
    fn set_interval(&mut self, kind: TimerKind, period_ms: u32) -> Result<TimerHandle, HostError>;
    fn clear_interval(&mut self, handle: TimerHandle);
    /// Current width of the chart container in px.
    fn container_width(&self) -> u32;
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("cannot {action} while the connection is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: ConnectionState,
    },
}

/// What an inbound message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Sample,
    Info,
    Ignored(String),
}

pub struct Session<H, W> {
    host: H,
    config: DashboardConfig,
    state: ConnectionState,
    playing: bool,
    ticker: DurationTicker,
    duration_timer: Option<TimerHandle>,
    poll_timer: Option<TimerHandle>,
    flame: FlameGraphController<W>,
    status: StatusBar,
}

impl<H: SessionHost, W: FlameWidget> Session<H, W> {
    pub fn new(host: H, widget: W, config: DashboardConfig) -> Self {
        let ticker = DurationTicker::starting_at(host.now_ms());
        let flame = FlameGraphController::new(widget, config.flame.cell_height);
        Self {
            host,
            config,
            state: ConnectionState::Disconnected,
            playing: true,
            ticker,
            duration_timer: None,
            poll_timer: None,
            flame,
            status: StatusBar::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn flame(&self) -> &FlameGraphController<W> {
        &self.flame
    }

    pub fn flame_mut(&mut self) -> &mut FlameGraphController<W> {
        &mut self.flame
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn duration_timer(&self) -> Option<TimerHandle> {
        self.duration_timer
    }

    pub fn poll_timer(&self) -> Option<TimerHandle> {
        self.poll_timer
    }

    /// Page load: start the duration ticker and begin connecting.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != ConnectionState::Disconnected {
            return Err(SessionError::InvalidTransition {
                action: "start",
                state: self.state,
            });
        }
        self.ticker = DurationTicker::starting_at(self.host.now_ms());
        let handle = self
            .host
            .set_interval(TimerKind::Duration, self.config.tick_interval_ms())?;
        self.duration_timer = Some(handle);
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    pub fn on_open(&mut self) -> Result<(), SessionError> {
        if self.state != ConnectionState::Connecting {
            return Err(SessionError::InvalidTransition {
                action: "open",
                state: self.state,
            });
        }
        self.start_polling()?;
        self.state = ConnectionState::Open;
        self.status.indicator = Some(StatusColor::Green);
        info!("connection open");
        Ok(())
    }

    pub fn on_message(&mut self, text: &str) -> Result<Dispatch, SessionError> {
        match protocol::decode(text)? {
            Message::Sample(sample) => {
                self.flame.set_height(sample.height);
                self.flame.on_resize(self.host.container_width());
                self.flame.merge(&sample.data);
                self.status.apply_sample(&sample);
                Ok(Dispatch::Sample)
            }
            Message::Info(info) => {
                info!(pid = info.pid, command = %info.command, "producer info");
                self.status.apply_info(&info);
                Ok(Dispatch::Info)
            }
            Message::Unknown(kind) => {
                debug!(kind = %kind, "ignoring message");
                Ok(Dispatch::Ignored(kind))
            }
        }
    }

    pub fn on_close(&mut self) {
        self.status.indicator = Some(StatusColor::Red);
        self.stop_timer(TimerKind::Duration);
        self.stop_timer(TimerKind::DataPoll);
        self.state = ConnectionState::Closed;
        info!("connection closed");
    }

    pub fn on_timer(&mut self, kind: TimerKind) -> Result<(), SessionError> {
        match kind {
            TimerKind::Duration => {
                self.status.duration = self.ticker.label_at(self.host.now_ms());
            }
            TimerKind::DataPoll => {
                if self.is_open() && self.playing {
                    self.host.send(DATA_REQUEST)?;
                }
            }
        }
        Ok(())
    }

    /// Pause or resume polling. Returns `false` (and does nothing) unless the
    /// connection is open. The socket itself stays open either way.
    pub fn toggle_play(&mut self) -> Result<bool, SessionError> {
        if !self.is_open() {
            return Ok(false);
        }

        if self.playing {
            self.stop_timer(TimerKind::DataPoll);
            self.status.indicator = Some(StatusColor::Yellow);
            self.status.play_icon = PlayIcon::Play;
        } else {
            self.start_polling()?;
            self.status.indicator = Some(StatusColor::Green);
            self.status.play_icon = PlayIcon::Pause;
        }
        self.playing = !self.playing;
        Ok(true)
    }

    pub fn search(&mut self, term: &str) {
        self.flame.search(term);
    }

    pub fn on_search_input(&mut self, term: &str) {
        self.flame.on_search_input(term);
    }

    pub fn clear(&mut self) {
        self.flame.clear();
    }

    pub fn reset_zoom(&mut self) {
        self.flame.reset_zoom();
    }

    pub fn on_resize(&mut self) {
        let width = self.host.container_width();
        self.flame.on_resize(width);
    }

    /// Cancel every timer; the session is unusable afterwards.
    pub fn shutdown(&mut self) {
        self.stop_timer(TimerKind::Duration);
        self.stop_timer(TimerKind::DataPoll);
        self.state = ConnectionState::Closed;
    }

    fn start_polling(&mut self) -> Result<(), SessionError> {
        self.host.send(DATA_REQUEST)?;
        self.stop_timer(TimerKind::DataPoll);
        let handle = self
            .host
            .set_interval(TimerKind::DataPoll, self.config.poll_interval_ms())?;
        self.poll_timer = Some(handle);
        Ok(())
    }

    fn stop_timer(&mut self, kind: TimerKind) {
        let slot = match kind {
            TimerKind::Duration => &mut self.duration_timer,
            TimerKind::DataPoll => &mut self.poll_timer,
        };
        if let Some(handle) = slot.take() {
            self.host.clear_interval(handle);
        }
    }
}

use std::collections::HashMap;
use std::time::Duration;

use flamewatch::clock;
use flamewatch::session::{HostError, SessionHost, TimerHandle, TimerKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// `SessionHost` for the native client.
///
/// Outgoing text and timer ticks are queued on channels; the client loop owns
/// the receiving ends and the socket.
pub struct TokioHost {
    outgoing: mpsc::UnboundedSender<String>,
    ticks: mpsc::UnboundedSender<TimerKind>,
    timers: HashMap<i32, JoinHandle<()>>,
    next_id: i32,
    width: u32,
}

impl TokioHost {
    pub fn new(
        outgoing: mpsc::UnboundedSender<String>,
        ticks: mpsc::UnboundedSender<TimerKind>,
        width: u32,
    ) -> Self {
        Self {
            outgoing,
            ticks,
            timers: HashMap::new(),
            next_id: 0,
            width,
        }
    }

    #[cfg(test)]
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }
}

impl SessionHost for TokioHost {
    fn send(&mut self, text: &str) -> Result<(), HostError> {
        self.outgoing
            .send(text.to_string())
            .map_err(|_| HostError::Send("socket writer is gone".to_string()))
    }

    fn set_interval(&mut self, kind: TimerKind, period_ms: u32) -> Result<TimerHandle, HostError> {
        let ticks = self.ticks.clone();
        let period = Duration::from_millis(u64::from(period_ms.max(1)));
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(kind).is_err() {
                    break;
                }
            }
        });

        self.next_id = self.next_id.wrapping_add(1);
        self.timers.insert(self.next_id, task);
        Ok(TimerHandle(self.next_id))
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        if let Some(task) = self.timers.remove(&handle.0) {
            task.abort();
        }
    }

    fn container_width(&self) -> u32 {
        self.width
    }

    fn now_ms(&self) -> u64 {
        clock::now_ms()
    }
}

impl Drop for TokioHost {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}

//! Wall-clock helpers for the elapsed-time label.

// `std::time::SystemTime::now()` panics on `wasm32-unknown-unknown`; `web-time`
// backs it with `Date.now()` in the browser.
#[cfg(target_arch = "wasm32")]
pub use web_time::{SystemTime, UNIX_EPOCH};

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch (0 if the clock is before it).
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// `HH:MM:SS`, each part padded to two digits. Hours are not capped.
pub fn format_hhmmss(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Elapsed time since a fixed wall-clock start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationTicker {
    started_at_ms: u64,
}

impl DurationTicker {
    pub fn starting_at(started_at_ms: u64) -> Self {
        Self { started_at_ms }
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// Whole seconds elapsed; a clock that went backwards reads as zero.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms) / 1000
    }

    pub fn label_at(&self, now_ms: u64) -> String {
        format_hhmmss(self.elapsed_secs(now_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_hhmmss(0), "00:00:00");
        assert_eq!(format_hhmmss(59), "00:00:59");
        assert_eq!(format_hhmmss(3661), "01:01:01");
        assert_eq!(format_hhmmss(36000), "10:00:00");
    }

    #[test]
    fn hours_past_99_grow_a_digit() {
        assert_eq!(format_hhmmss(360_000), "100:00:00");
    }

    #[test]
    fn ticker_truncates_to_whole_seconds() {
        let t = DurationTicker::starting_at(10_000);
        assert_eq!(t.label_at(10_999), "00:00:00");
        assert_eq!(t.label_at(11_000), "00:00:01");
        assert_eq!(t.label_at(10_000 + 3_661_500), "01:01:01");
    }

    #[test]
    fn ticker_saturates_when_clock_goes_backwards() {
        let t = DurationTicker::starting_at(50_000);
        assert_eq!(t.elapsed_secs(40_000), 0);
    }
}

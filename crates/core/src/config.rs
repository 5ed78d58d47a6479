use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::location::SOCKET_PATH_SUFFIX;
use crate::widget::FlameGraphConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Dashboard timing and widget settings. Every field has a default, so a
/// partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Period of the `data` requests while playing.
    pub poll_interval_ms: u32,
    /// Period of the duration label refresh.
    pub tick_interval_ms: u32,
    pub socket_path_suffix: String,
    pub flame: FlameGraphConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3000,
            tick_interval_ms: 1000,
            socket_path_suffix: SOCKET_PATH_SUFFIX.to_string(),
            flame: FlameGraphConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Intervals below this are clamped; the browser floors timers anyway.
    pub const MIN_INTERVAL_MS: u32 = 10;

    pub fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms.max(Self::MIN_INTERVAL_MS)
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms.max(Self::MIN_INTERVAL_MS)
    }
}

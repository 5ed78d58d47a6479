use std::path::PathBuf;

use clap::Parser;
use flamewatch::config::{ConfigError, DashboardConfig};
use flamewatch::location::{LocationError, PageLocation};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "flamewatch-cli")]
#[command(version = "0.1.0")]
#[command(about = "Headless client for a live flamewatch producer")]
pub struct Args {
    /// Dashboard page URL (http/https) or producer socket URL (ws/wss)
    pub url: String,

    /// JSON file with dashboard settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the data poll interval
    #[arg(long)]
    pub poll_ms: Option<u32>,

    /// Hottest frames to log after each sample
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Highlight frames containing this text and log the match summary
    #[arg(short, long)]
    pub search: Option<String>,

    /// Virtual chart width in px used for layout
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// File settings (or defaults) with flag overrides applied.
    pub fn dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(ms) = self.poll_ms {
            config.poll_interval_ms = ms;
        }
        Ok(config)
    }
}

/// Socket URLs pass through; page URLs get the socket scheme and suffix.
pub fn resolve_socket_url(input: &str, suffix: &str) -> Result<String, LocationError> {
    if let Ok(url) = Url::parse(input) {
        if matches!(url.scheme(), "ws" | "wss") {
            return Ok(input.to_string());
        }
    }
    Ok(PageLocation::parse(input)?.socket_url(suffix))
}

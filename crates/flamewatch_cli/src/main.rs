//! flamewatch-cli - headless client for a live flamewatch producer
//!
//! Connects to the producer socket, polls for samples on the dashboard's
//! schedule, and logs the status bar and hottest frames after every sample.
//!
//! Log filtering follows `RUST_LOG` (default `info`).

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod client;
mod host;

use args::{resolve_socket_url, Args};
use client::ReportOptions;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args = Args::parse();
    let config = args.dashboard_config()?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let url = resolve_socket_url(&args.url, &config.socket_path_suffix)?;
    info!(
        poll_ms = config.poll_interval_ms(),
        tick_ms = config.tick_interval_ms(),
        "settings loaded"
    );

    let report = ReportOptions {
        top: args.top,
        search: args.search.clone().filter(|s| !s.is_empty()),
        width: args.width,
    };
    client::run(&url, config, report).await?;
    Ok(())
}

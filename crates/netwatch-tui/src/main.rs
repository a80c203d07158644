//! `netwatch` — Real-time terminal dashboard for a NetDashboard backend.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `netwatch-core`'s watch channels. Screens are navigable via number keys:
//! Dashboard and Services.
//!
//! Logs are written to a file (default `/tmp/netwatch.log`) to avoid
//! corrupting the terminal UI. A background data bridge task continuously
//! streams store updates from the controller into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app
//! launch.

mod action;
mod app;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use netwatch_core::{DashboardConfig, DashboardController};

use crate::app::App;

/// Terminal dashboard for live host/network telemetry and service health.
#[derive(Parser, Debug)]
#[command(name = "netwatch", version, about)]
struct Cli {
    /// Backend base URL (e.g., http://192.168.1.50:5000)
    #[arg(short = 's', long, env = "NETWATCH_SERVER")]
    server: Option<String>,

    /// Config file path (defaults to the platform config dir)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log file path (defaults to /tmp/netwatch.log)
    #[arg(long, default_value = "/tmp/netwatch.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("netwatch={log_level}")));

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("netwatch.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Resolve the dashboard configuration.
///
/// Priority: `--server` flag > config file (explicit `--config` path or the
/// platform default) > built-in defaults.
fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let file_config = match &cli.config {
        Some(path) => netwatch_config::load_config_from(path)?,
        None => netwatch_config::load_config_or_default(),
    };
    let mut config = netwatch_config::to_dashboard_config(&file_config)?;

    if let Some(ref server) = cli.server {
        config.url = server
            .parse()
            .map_err(|e| eyre!("invalid --server URL '{server}': {e}"))?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let config = resolve_config(&cli)?;
    info!(url = %config.url, "starting netwatch");

    let controller = DashboardController::new(config)?;
    let mut app = App::new(controller);
    app.run().await?;

    Ok(())
}

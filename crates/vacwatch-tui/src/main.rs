//! `vacwatch-tui`: terminal dashboard and live poll monitor.
//!
//! Screens are navigable via number keys (1-4): Overview, Vacancies,
//! Detail and Watch. The watcher runs in-process: it owns the poll timer,
//! persists results to the shared state file and raises alerts that show
//! up as toasts and a badge in the status bar.
//!
//! Logs go to a file (default `<data dir>/vacwatch-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vacwatch_config::Config;
use vacwatch_core::{ChannelNotifier, FanoutNotifier, FileStore, LogNotifier, Notifier, Watcher};

use crate::app::App;

/// Terminal dashboard for the vacancy API, with a live count watcher.
#[derive(Parser, Debug)]
#[command(name = "vacwatch-tui", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// State file shared with the `vacwatch` CLI
    #[arg(long, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// API base for the dashboard views, overriding the stored one
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Log file path
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Nothing may log to stdout/stderr while the TUI
/// owns the terminal. Hold the returned guard until exit so logs flush.
fn setup_tracing(cli: &Cli, config: &Config) -> WorkerGuard {
    let level = match cli.verbose {
        0 => config.log.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vacwatch_tui={level},vacwatch_core={level},vacwatch_api={level}"
        ))
    });

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.log.file.clone())
        .unwrap_or_else(|| vacwatch_config::data_dir().join("vacwatch-tui.log"));
    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    let _ = std::fs::create_dir_all(log_dir);
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("vacwatch-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched.
    tui::install_hooks()?;

    let config_file = cli.config.clone().unwrap_or_else(vacwatch_config::config_path);
    let mut config = vacwatch_config::load_config_from(&config_file)
        .wrap_err_with(|| format!("loading {}", config_file.display()))?;
    if let Some(ref path) = cli.state_file {
        config.state_file = Some(path.clone());
    }

    let _log_guard = setup_tracing(&cli, &config);

    let state_file = config.state_file_path();
    info!(
        config = %config_file.display(),
        state = %state_file.display(),
        "starting vacwatch-tui"
    );

    let store = Arc::new(
        FileStore::open(state_file.clone())
            .wrap_err_with(|| format!("opening {}", state_file.display()))?,
    );
    let channel = Arc::new(ChannelNotifier::new());
    let notifier = FanoutNotifier::new()
        .with(Arc::new(LogNotifier))
        .with(Arc::clone(&channel) as Arc<dyn Notifier>);
    let watcher = Watcher::new(config.to_watcher_config(), store, Arc::new(notifier))?;

    let http = config.to_transport().build_client()?;
    let api_base = cli.api_base.clone().or_else(|| config.api.base_url.clone());

    let mut app = App::new(watcher, channel, http, api_base);
    app.run().await
}

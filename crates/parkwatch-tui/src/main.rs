//! `parkwatch-tui`: live terminal dashboard for the parking monitoring API.
//!
//! Four screens, navigable with number keys 1-4: Dashboard, Live, Alerts
//! and Analytics. A background data bridge owns the [`Monitor`], polls live
//! device status and re-fetches every view when the filter changes.
//!
//! Logs go to a file (default `/tmp/parkwatch-tui.log`) so they never
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

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use parkwatch_core::{Monitor, MonitorConfig};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

/// Terminal dashboard for parking facility monitoring.
#[derive(Parser, Debug)]
#[command(name = "parkwatch-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "PARKWATCH_PROFILE")]
    profile: Option<String>,

    /// API root URL, overriding the profile (e.g. http://localhost:8000/api)
    #[arg(short = 'u', long, env = "PARKWATCH_API_URL")]
    api_url: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/parkwatch-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing; anything on stdout/stderr would corrupt the UI.
/// Hold the guard for the lifetime of the app so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("parkwatch_tui={log_level},parkwatch_core={log_level}"))
    });

    let log_dir = cli.log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("parkwatch-tui.log"));

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

/// Profile from the shared config file, then `--api-url` on top.
fn resolve_config(cli: &Cli) -> Result<MonitorConfig> {
    let cfg = parkwatch_config::load_config().wrap_err("could not load config")?;
    let name = cli.profile.clone().unwrap_or_else(|| cfg.active_profile_name());
    let profile = cfg.profile(&name)?;
    let mut config = parkwatch_config::profile_to_monitor_config(&profile, &cfg.defaults)
        .wrap_err_with(|| format!("invalid profile '{name}'"))?;

    if let Some(url) = &cli.api_url {
        config.api_url = parkwatch_config::validate_api_url(url)?.to_string();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config = resolve_config(&cli)?;
    info!(
        api_url = %config.api_url,
        poll_interval = ?config.poll_interval,
        "starting parkwatch-tui"
    );

    let monitor = Monitor::new(config)?;
    let mut app = App::new(monitor);
    app.run().await?;

    Ok(())
}

//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use parkwatch_core::{FilterKey, FilterState, FilterStore, Monitor, MonitorConfig};

use crate::cli::{FilterArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Build the filter for a list command: the profile's facility/zone scope,
/// then any flags on top. An explicit `--facility` drops the profile zone.
pub fn scope_filter(filter: &FilterArgs, config: &MonitorConfig) -> FilterStore {
    let mut seed = FilterState::default();
    if let Some(facility) = config.facility {
        seed.facility = facility.to_string();
    }
    if let Some(zone) = config.zone {
        seed.zone = zone.to_string();
    }

    let mut store = FilterStore::new(seed);
    if let Some(facility) = filter.facility {
        store.update(FilterKey::Facility, facility.to_string());
    }
    if let Some(zone) = filter.zone {
        store.update(FilterKey::Zone, zone.to_string());
    }
    if let Some(ref search) = filter.search {
        store.update(FilterKey::Search, search.clone());
    }
    store
}

pub fn monitor_filter(filter: &FilterArgs, monitor: &Monitor) -> FilterStore {
    scope_filter(filter, monitor.config())
}

/// Parse a `YYYY-MM-DD` date flag.
pub fn parse_date(value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CliError::Validation {
        field: "date".into(),
        reason: format!("expected YYYY-MM-DD, got '{value}'"),
    })
}

pub fn color(global: &GlobalOpts) -> bool {
    output::should_color(global.color)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, operation: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            operation: operation.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Stderr spinner for slow operations; hidden in quiet mode or when stderr
/// is not a terminal.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

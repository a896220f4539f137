//! Command dispatch: bridges CLI args -> monitor calls -> output formatting.

pub mod alerts;
pub mod analytics;
pub mod config_cmd;
pub mod devices;
pub mod export;
pub mod facilities;
pub mod live;
pub mod summary;
pub mod util;
pub mod zones;

use parkwatch_core::Monitor;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Summary(args) => summary::handle(monitor, args, global).await,
        Command::Zones(args) => zones::handle(monitor, &args, global).await,
        Command::Devices(args) => devices::handle(monitor, args, global).await,
        Command::Live(args) => live::handle(monitor, args, global).await,
        Command::Facilities(args) => facilities::handle(monitor, args, global).await,
        Command::Alerts(args) => alerts::handle(monitor, args, global).await,
        Command::Analytics(args) => analytics::handle(monitor, args, global).await,
        Command::Export(args) => export::handle(monitor, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled without the API".into(),
        )),
    }
}

//! Clap derive structures for the `parkwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap + clap_complete so `build.rs` can include it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// parkwatch -- monitor a parking sensor network from the command line
#[derive(Debug, Parser)]
#[command(
    name = "parkwatch",
    version,
    about = "Monitor parking facilities, sensors and alerts from the command line",
    long_about = "A CLI for the parking monitoring API.\n\n\
        Shows dashboard summaries, live device status, alerts and analytics,\n\
        acknowledges alerts, and exports tables to CSV, Excel or PDF.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "PARKWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Monitoring API root URL (overrides profile)
    #[arg(long, short = 'u', env = "PARKWATCH_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PARKWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PARKWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard summary cards
    #[command(alias = "sum")]
    Summary(SummaryArgs),

    /// Show zone performance
    Zones(FilterArgs),

    /// Show device heartbeats and health
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show live device status, optionally refreshing on a fixed cadence
    Live(LiveArgs),

    /// List facilities and their zones
    #[command(alias = "fac")]
    Facilities(FacilitiesArgs),

    /// List and acknowledge alerts
    Alerts(AlertsArgs),

    /// Occupancy and device health analytics
    Analytics(AnalyticsArgs),

    /// Export a table to CSV, Excel or PDF
    Export(ExportArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared filter arguments ──────────────────────────────────────────

/// Scope arguments shared by the list commands. Unset flags fall back to
/// the profile's facility/zone.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Facility ID
    #[arg(long, short = 'f')]
    pub facility: Option<u64>,

    /// Zone ID
    #[arg(long, short = 'z')]
    pub zone: Option<u64>,

    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceStatusArg {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlertSortArg {
    CreatedAt,
    Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrderArg {
    Asc,
    Desc,
}

// ── Summary ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Day to summarise (YYYY-MM-DD, default today)
    #[arg(long, short = 'd')]
    pub date: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Only devices in this status
    #[arg(long)]
    pub status: Option<DeviceStatusArg>,
}

// ── Live ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LiveArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Keep polling and reprint on every update (Ctrl-C to stop)
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Poll interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Facilities ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FacilitiesArgs {
    #[command(subcommand)]
    pub command: FacilitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FacilitiesCommand {
    /// List facilities
    #[command(alias = "ls")]
    List,

    /// List the zones of one facility
    Zones {
        /// Facility ID
        facility: u64,
    },
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Clone, Default, Args)]
pub struct AlertFilterArgs {
    #[command(flatten)]
    pub scope: FilterArgs,

    /// Only alerts of this severity
    #[arg(long)]
    pub severity: Option<SeverityArg>,

    /// Only acknowledged (true) or unacknowledged (false) alerts
    #[arg(long)]
    pub acknowledged: Option<bool>,

    /// Show resolved alerts instead of active ones
    #[arg(long)]
    pub inactive: bool,

    /// Sort field
    #[arg(long)]
    pub sort_by: Option<AlertSortArg>,

    /// Sort direction
    #[arg(long)]
    pub order: Option<SortOrderArg>,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts
    #[command(alias = "ls")]
    List(AlertFilterArgs),

    /// Acknowledge one alert
    Ack {
        /// Alert ID
        id: u64,
    },

    /// Acknowledge several alerts in one request
    BulkAck {
        /// Alert IDs
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<u64>,

        /// Every unacknowledged alert matching the filters
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        filter: AlertFilterArgs,
    },
}

// ── Analytics ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub command: AnalyticsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// Occupancy by hour of day
    Hourly(FilterArgs),

    /// Daily occupancy over recent days
    Trend {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of days
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Device health categories
    Health(FilterArgs),
}

// ── Export ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Devices,
    Live,
    Zones,
    Alerts,
    Summary,
    /// Every table, one sheet each (excel only)
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    Csv,
    #[value(alias = "xlsx")]
    Excel,
    Pdf,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// What to export
    pub target: ExportTarget,

    /// File format
    #[arg(long, short = 'F', default_value = "csv")]
    pub format: ExportFormatArg,

    /// Output file (default: <target>_<date>.<ext> in the current directory)
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// List profile names
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Set a profile value (api_url, timeout, poll_interval, facility, zone)
    Set {
        /// Key to set
        key: String,
        /// Value (empty clears optional keys)
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

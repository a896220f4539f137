//! Shared configuration for the parkwatch CLI and TUI.
//!
//! TOML profiles naming a monitoring API, plus polling and scope defaults,
//! and translation to `parkwatch_core::MonitorConfig`. Both binaries depend
//! on this crate; the CLI layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use parkwatch_core::MonitorConfig;
use parkwatch_core::config::DEFAULT_API_URL;

/// Environment prefix; nested keys use `__`, e.g.
/// `PARKWATCH_DEFAULTS__POLL_INTERVAL=5`.
pub const ENV_PREFIX: &str = "PARKWATCH_";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "PARKWATCH_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Live-status poll interval in seconds; 0 disables background polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    10
}

/// A named monitoring API profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "http://localhost:8000/api").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override poll interval.
    pub poll_interval: Option<u64>,

    /// Facility scope applied when no filter flag is given.
    pub facility: Option<u64>,

    /// Zone scope applied when no filter flag is given.
    pub zone: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: None,
            poll_interval: None,
            facility: None,
            zone: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

/// Keys accepted by [`Profile::set`].
pub const PROFILE_KEYS: &[&str] = &["api_url", "timeout", "poll_interval", "facility", "zone"];

impl Profile {
    /// Set one field from its textual form. An empty value clears optional
    /// fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "api_url" => {
                validate_api_url(value)?;
                self.api_url = value.to_owned();
            }
            "timeout" => self.timeout = parse_optional(key, value)?,
            "poll_interval" => self.poll_interval = parse_optional(key, value)?,
            "facility" => self.facility = parse_optional(key, value)?,
            "zone" => self.zone = parse_optional(key, value)?,
            other => {
                return Err(ConfigError::Validation {
                    field: other.into(),
                    reason: format!("unknown key, expected one of: {}", PROFILE_KEYS.join(", ")),
                });
            }
        }
        Ok(())
    }
}

fn parse_optional(field: &str, value: &str) -> Result<Option<u64>, ConfigError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Validation {
            field: field.into(),
            reason: format!("expected a non-negative integer, got '{value}'"),
        })
}

/// Accept only absolute `http`/`https` URLs.
pub fn validate_api_url(value: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = value.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {value}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
        });
    }
    Ok(url)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$PARKWATCH_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "parkwatch", "parkwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("parkwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering `PARKWATCH_` env on top.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

impl Config {
    /// Profile name to use when none is given explicitly.
    pub fn active_profile_name(&self) -> String {
        self.default_profile.clone().unwrap_or_else(|| "default".into())
    }

    /// Look up `name`; a missing "default" profile resolves to built-in
    /// defaults so a fresh install works without a config file.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }
}

/// Build a `MonitorConfig` from a profile, falling back to global defaults
/// for anything the profile leaves unset. No CLI flag overrides.
pub fn profile_to_monitor_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    let url = validate_api_url(&profile.api_url)?;

    Ok(MonitorConfig {
        api_url: url.to_string(),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        poll_interval: Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval)),
        facility: profile.facility,
        zone: profile.zone,
    })
}

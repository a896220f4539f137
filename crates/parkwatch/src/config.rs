//! CLI configuration: thin wrapper around `parkwatch_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --timeout, --profile).

use std::time::Duration;

use parkwatch_core::MonitorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use parkwatch_config::{
    Config, Defaults, PROFILE_KEYS, Profile, config_path, load_config, profile_to_monitor_config,
    save_config, validate_api_url,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name())
}

/// Build a `MonitorConfig`: flag/env > profile > defaults.
pub fn resolve_monitor_config(global: &GlobalOpts, config: &Config) -> Result<MonitorConfig, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = config.profile(&profile_name).map_err(|_| CliError::ProfileNotFound {
        available: available_profiles(config),
        name: profile_name,
    })?;

    let mut resolved = profile_to_monitor_config(&profile, &config.defaults)?;

    if let Some(ref url) = global.api_url {
        resolved.api_url = validate_api_url(url)?.to_string();
    }
    if let Some(timeout) = global.timeout {
        resolved.timeout = Duration::from_secs(timeout);
    }

    Ok(resolved)
}

pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        return "(none)".into();
    }
    config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["parkwatch"];
        argv.extend_from_slice(args);
        argv.push("zones");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_profile() {
        let mut config = Config::default();
        let mut profile = Profile::default();
        profile.set("timeout", "3").unwrap();
        profile.set("facility", "2").unwrap();
        config.profiles.insert("default".into(), profile);

        let resolved = resolve_monitor_config(
            &global(&["--api-url", "http://backend:9000/api", "--timeout", "20"]),
            &config,
        )
        .unwrap();

        assert_eq!(resolved.api_url, "http://backend:9000/api");
        assert_eq!(resolved.timeout, Duration::from_secs(20));
        assert_eq!(resolved.facility, Some(2));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut config = Config::default();
        config.profiles.insert("site-a".into(), Profile::default());

        let err = resolve_monitor_config(&global(&["--profile", "site-b"]), &config).unwrap_err();

        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "site-b");
                assert_eq!(available, "site-a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_url_flag_is_rejected() {
        let err = resolve_monitor_config(&global(&["--api-url", "not a url"]), &Config::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}

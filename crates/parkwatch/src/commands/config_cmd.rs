//! Config subcommand handlers.

use std::fmt::Write;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, PROFILE_KEYS, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval = {}", cfg.defaults.poll_interval);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        let optional = [
            ("timeout", p.timeout),
            ("poll_interval", p.poll_interval),
            ("facility", p.facility),
            ("zone", p.zone),
        ];
        for (key, value) in optional.iter().filter_map(|(k, v)| v.map(|v| (k, v))) {
            let _ = writeln!(out, "{key} = {value}");
        }
    }

    out.trim_end().to_owned()
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("Parking monitor configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API URL")
                .default(Profile::default().api_url)
                .interact_text()
                .map_err(prompt_err)?;
            config::validate_api_url(&api_url)?;

            let poll_interval: u64 = Input::new()
                .with_prompt("Live refresh interval in seconds (0 disables)")
                .default(Defaults::default().poll_interval)
                .interact_text()
                .map_err(prompt_err)?;

            let mut cfg = config::load_config().unwrap_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    api_url,
                    poll_interval: Some(poll_interval),
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());

            let path = config::save_config(&cfg)?;
            eprintln!("\nConfiguration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: parkwatch summary");
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let active = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: parkwatch config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if *name == active { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let key = key.replace('-', "_");
            if !PROFILE_KEYS.contains(&key.as_str()) {
                return Err(CliError::Validation {
                    reason: format!("unknown config key, valid keys: {}", PROFILE_KEYS.join(", ")),
                    field: key,
                });
            }

            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            cfg.profiles
                .entry(profile_name.clone())
                .or_default()
                .set(&key, value.trim())?;

            config::save_config(&cfg)?;
            eprintln!("Set {key} on profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_lists_only_set_profile_fields() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lot-a".into(),
            Profile {
                facility: Some(4),
                ..Profile::default()
            },
        );

        let text = format_config(&cfg);
        assert!(text.contains("[profiles.lot-a]"));
        assert!(text.contains("facility = 4"));
        assert!(!text.contains("zone ="));
        assert!(text.contains("poll_interval = 10"));
    }
}

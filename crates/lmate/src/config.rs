//! Profile resolution: config file, then profile, then CLI flags.
//!
//! Core never sees these types -- it receives a pre-built `DashboardConfig`.

use clap::ValueEnum;
use lmate_config::{ConfigError, Defaults};
use lmate_core::DashboardConfig;

use crate::cli::{ColorMode, GlobalOpts};
use crate::error::CliError;

pub use lmate_config::{Config, Profile, config_path, load_config, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name())
}

/// Build the `DashboardConfig` for this invocation.
///
/// An explicitly requested profile must exist. Without one, the default
/// profile is used if present and built-in defaults otherwise. Flags and
/// `LMATE_*` variables override individual profile fields.
pub fn resolve_dashboard_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<DashboardConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if global.profile.is_some() && !cfg.profiles.contains_key(&profile_name) {
        let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    let profile = apply_overrides(cfg.profile_or_default(&profile_name), global);
    tracing::debug!(
        profile = %profile_name,
        base_url = %profile.base_url,
        serial = %profile.serial,
        "resolved profile"
    );

    lmate_config::profile_to_dashboard_config(&profile, &cfg.defaults).map_err(|e| match e {
        ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
        other => other.into(),
    })
}

/// Fill `--output` / `--color` from `[defaults]` when neither the flag
/// nor its environment variable was given.
pub fn apply_defaults(global: &mut GlobalOpts, defaults: &Defaults) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_default("defaults.output", &defaults.output)?);
    }
    if global.color.is_none() {
        global.color = Some(parse_default::<ColorMode>("defaults.color", &defaults.color)?);
    }
    Ok(())
}

fn parse_default<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Layer CLI flag values over a stored profile.
fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if let Some(ref serial) = global.serial {
        profile.serial.clone_from(serial);
    }
    if let Some(ms) = global.timeout_ms {
        profile.timeout_ms = Some(ms);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{Cli, OutputFormat};
    use clap::Parser;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["lmate"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::parse_from(argv).global
    }

    #[test]
    fn flags_override_profile_fields() {
        let opts = global(&[
            "--base-url",
            "http://10.0.0.9/api",
            "--serial",
            "LAB-1",
            "--timeout-ms",
            "250",
            "-k",
        ]);
        let profile = apply_overrides(Profile::default(), &opts);
        assert_eq!(profile.base_url, "http://10.0.0.9/api");
        assert_eq!(profile.serial, "LAB-1");
        assert_eq!(profile.timeout_ms, Some(250));
        assert_eq!(profile.insecure, Some(true));
    }

    #[test]
    fn profile_kept_without_flags() {
        let stored = Profile {
            serial: "KEEP".into(),
            timeout_ms: Some(900),
            ..Profile::default()
        };
        let profile = apply_overrides(stored.clone(), &global(&[]));
        assert_eq!(profile, stored);
    }

    #[test]
    fn config_defaults_fill_unset_format_flags() {
        let defaults = Defaults {
            output: "json-compact".into(),
            color: "never".into(),
            ..Defaults::default()
        };

        let mut opts = global(&[]);
        apply_defaults(&mut opts, &defaults).unwrap();
        assert_eq!(opts.output_format(), &OutputFormat::JsonCompact);
        assert_eq!(opts.color_mode(), &ColorMode::Never);

        let mut opts = global(&["-o", "yaml", "--color", "always"]);
        apply_defaults(&mut opts, &defaults).unwrap();
        assert_eq!(opts.output_format(), &OutputFormat::Yaml);
        assert_eq!(opts.color_mode(), &ColorMode::Always);
    }

    #[test]
    fn unknown_default_format_is_rejected() {
        let defaults = Defaults {
            output: "xml".into(),
            ..Defaults::default()
        };
        let err = apply_defaults(&mut global(&[]), &defaults).unwrap_err();
        assert!(
            matches!(err, CliError::Validation { ref field, .. } if field == "defaults.output")
        );
    }

    #[test]
    fn explicit_profile_wins_over_default() {
        let cfg = Config::default();
        assert_eq!(active_profile_name(&global(&["-p", "lab"]), &cfg), "lab");
        assert_eq!(active_profile_name(&global(&[]), &cfg), "default");
    }
}

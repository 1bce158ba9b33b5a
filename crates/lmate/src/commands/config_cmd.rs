//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::{Input, Select};
use strum::IntoEnumIterator;

use lmate_core::Environment;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: wizard, or defaults with --yes ────────────────────
        ConfigCommand::Init => {
            let mut cfg = config::load_config()?;
            let (profile_name, profile) = if global.yes {
                let name = config::active_profile_name(global, &cfg);
                (name, seeded_profile(global))
            } else {
                if !std::io::stdin().is_terminal() {
                    return Err(CliError::NonInteractiveRequiresYes {
                        action: "config init".into(),
                    });
                }
                wizard(global)?
            };

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
                eprintln!("  Active profile: {profile_name}");
                eprintln!("\n  Test it: lmate status --strict");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = match global.output_format() {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)?,
                format => {
                    output::render_single(format, &cfg, |_| String::new(), |_| String::new())?
                }
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

/// Built-in profile with any `--base-url` / `--serial` / `--timeout-ms`
/// flags folded in.
fn seeded_profile(global: &GlobalOpts) -> Profile {
    let mut profile = Profile::default();
    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if let Some(ref serial) = global.serial {
        profile.serial.clone_from(serial);
    }
    profile.timeout_ms = global.timeout_ms;
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile
}

fn wizard(global: &GlobalOpts) -> Result<(String, Profile), CliError> {
    let seed = seeded_profile(global);
    eprintln!("L-Mate dashboard: configuration wizard");
    eprintln!("   Config path: {}\n", config::config_path().display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let base_url: String = Input::new()
        .with_prompt("Backend API root")
        .default(seed.base_url.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            input
                .parse::<url::Url>()
                .map(|_| ())
                .map_err(|e| format!("invalid URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let serial: String = Input::new()
        .with_prompt("Device serial")
        .default(seed.serial.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let envs: Vec<Environment> = Environment::iter().collect();
    let labels: Vec<String> = envs.iter().map(ToString::to_string).collect();
    let choice = Select::new()
        .with_prompt("Onboarding environment")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    Ok((
        profile_name,
        Profile {
            base_url,
            serial,
            environment: envs.get(choice).copied(),
            ..seed
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn seeded_profile_takes_flags() {
        let cli = Cli::parse_from([
            "lmate",
            "-s",
            "LAB-9",
            "--timeout-ms",
            "1500",
            "config",
            "init",
        ]);
        let profile = seeded_profile(&cli.global);
        assert_eq!(profile.serial, "LAB-9");
        assert_eq!(profile.timeout_ms, Some(1500));
        assert_eq!(profile.base_url, lmate_config::DEFAULT_BASE_URL);
    }
}

//! Onboarding command handlers.

use lmate_core::{Dashboard, Environment};

use crate::cli::{GlobalOpts, OnboardArgs, OnboardCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    dashboard: &Dashboard,
    args: &OnboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());

    let out = match args.command {
        OnboardCommand::Trigger => {
            let ack = dashboard.trigger_onboarding().await?;
            util::require_live_source(global, "trigger onboarding", ack.source)?;
            output::render_single(
                global.output_format(),
                &ack,
                |a| {
                    format!(
                        "Onboarding triggered for {} at {} [{}]",
                        a.value.serial,
                        a.value
                            .triggered_at
                            .as_ref()
                            .map_or_else(|| "-".into(), ToString::to_string),
                        output::source_label(a.source, color)
                    )
                },
                |a| a.value.serial.clone(),
            )?
        }

        OnboardCommand::SetEnv { env } => {
            let ack = dashboard.set_environment(Environment::from(env)).await?;
            util::require_live_source(global, "set environment", ack.source)?;
            output::render_single(
                global.output_format(),
                &ack,
                |a| {
                    format!(
                        "Environment for {} set to {} [{}]",
                        a.value.serial,
                        a.value.env,
                        output::source_label(a.source, color)
                    )
                },
                |a| a.value.env.to_string(),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

//! Device command handlers.

use tabled::Tabled;

use lmate_core::Dashboard;

use crate::cli::{DeviceArgs, DeviceCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Event")]
    event: String,
}

pub async fn handle(
    dashboard: &Dashboard,
    args: &DeviceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color_mode());

    match args.command {
        DeviceCommand::History => {
            let history = dashboard.history().await;
            util::require_live_source(global, "device history", history.source)?;
            tracing::debug!(
                events = history.value.events.len(),
                source = %history.source,
                "device history"
            );
            let events = &history.value.events;
            let out = match global.output_format() {
                OutputFormat::Table if events.is_empty() => format!(
                    "No history events [{}]",
                    output::source_label(history.source, color)
                ),
                OutputFormat::Table => {
                    let rows: Vec<EventRow> = events
                        .iter()
                        .enumerate()
                        .map(|(i, e)| EventRow {
                            index: i + 1,
                            event: e.to_string(),
                        })
                        .collect();
                    output::render_table(&rows)
                }
                _ => output::render_list(
                    global.output_format(),
                    events,
                    |e| EventRow {
                        index: 0,
                        event: e.to_string(),
                    },
                    ToString::to_string,
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DeviceCommand::Reset => {
            let serial = &dashboard.config().serial;
            if !util::confirm(
                &format!("Reset device {serial} to factory defaults?"),
                "factory reset",
                global.yes,
            )? {
                eprintln!("Aborted.");
                return Ok(());
            }

            let ack = dashboard.factory_reset().await?;
            util::require_live_source(global, "factory reset", ack.source)?;
            let out = output::render_single(
                global.output_format(),
                &ack,
                |a| {
                    format!(
                        "Device {} reset to factory defaults [{}]",
                        a.value.serial,
                        output::source_label(a.source, color)
                    )
                },
                |a| a.value.serial.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

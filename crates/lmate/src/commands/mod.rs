//! Command dispatch: bridges CLI args -> dashboard operations -> output formatting.

pub mod config_cmd;
pub mod device;
pub mod metrics;
pub mod onboard;
pub mod status;
pub mod util;
pub mod watch;

use lmate_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(dashboard, global).await,
        Command::Metrics(args) => metrics::handle(dashboard, &args, global).await,
        Command::Watch(args) => watch::handle(dashboard, &args, global).await,
        Command::Onboard(args) => onboard::handle(dashboard, &args, global).await,
        Command::Device(args) => device::handle(dashboard, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

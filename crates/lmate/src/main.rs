mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lmate_core::Dashboard;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    // Shell completions need neither config nor backend
    if let Command::Completions(ref args) = cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        generate(args.shell, &mut cmd, "lmate", &mut std::io::stdout());
        return Ok(());
    }

    // `config path` must still work over a broken file
    let loaded = config::load_config();
    if let Ok(ref cfg) = loaded {
        config::apply_defaults(&mut cli.global, &cfg.defaults)?;
    }

    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global),

        // All other commands poll the backend
        cmd => {
            let cfg = loaded?;
            let dashboard_config = config::resolve_dashboard_config(&cli.global, &cfg)?;
            let dashboard = Dashboard::new(dashboard_config)?;

            if cli.global.strict {
                let record = dashboard.probe().await?;
                tracing::debug!(status = %record.status, "backend reachable");
            }

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &dashboard, &cli.global).await
        }
    }
}

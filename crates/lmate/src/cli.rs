//! Clap derive structures for the `lmate` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use lmate_core::Environment;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lmate -- watch an L-Mate device onboard, provision, and report telemetry
#[derive(Debug, Parser)]
#[command(
    name = "lmate",
    version,
    about = "Poll an L-Mate device's provisioning and telemetry backend",
    long_about = "Polls the L-Mate backend for onboarding, firmware, and metric data.\n\n\
        Every call is bounded by a timeout. When the backend is unreachable or\n\
        answers badly, plausible synthetic data is shown instead and marked\n\
        as `mock`. Use --strict to fail instead.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "LMATE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend API root (overrides profile)
    #[arg(long, short = 'u', env = "LMATE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Device serial (overrides profile)
    #[arg(long, short = 's', env = "LMATE_SERIAL", global = true)]
    pub serial: Option<String>,

    /// Bounded wait per backend call, in milliseconds (overrides profile)
    #[arg(long, env = "LMATE_TIMEOUT_MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Fail instead of showing mock data when any backend call falls back
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output format [default: table, or `defaults.output` from config]
    #[arg(long, short = 'o', env = "LMATE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto, or `defaults.color` from config]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LMATE_INSECURE", global = true)]
    pub insecure: bool,
}

impl GlobalOpts {
    pub fn output_format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }

    pub fn color_mode(&self) -> &ColorMode {
        self.color.as_ref().unwrap_or(&ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
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
    /// Run one provisioning poll and show the device snapshot
    #[command(alias = "st")]
    Status,

    /// Sample every metric and show the latest values with a sparkline
    #[command(alias = "m")]
    Metrics(MetricsArgs),

    /// Poll both cadences and print every state change
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Onboarding operations
    #[command(alias = "ob")]
    Onboard(OnboardArgs),

    /// Device operations
    #[command(alias = "dev", alias = "d")]
    Device(DeviceArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Metrics ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Number of metric polls, one metrics interval apart
    #[arg(long, short = 'n', default_value = "1")]
    pub ticks: u32,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many seconds (default: until Ctrl-C)
    #[arg(long, short = 'd')]
    pub duration: Option<u64>,
}

// ── Onboard ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OnboardArgs {
    #[command(subcommand)]
    pub command: OnboardCommand,
}

#[derive(Debug, Subcommand)]
pub enum OnboardCommand {
    /// Start onboarding
    Trigger,

    /// Select the onboarding environment
    SetEnv {
        /// Target environment
        env: EnvArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EnvArg {
    Dev,
    Qa,
    Prod,
}

impl From<EnvArg> for Environment {
    fn from(arg: EnvArg) -> Self {
        match arg {
            EnvArg::Dev => Environment::Dev,
            EnvArg::Qa => Environment::Qa,
            EnvArg::Prod => Environment::Prod,
        }
    }
}

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Show device history events
    History,

    /// Reset the device to factory defaults
    Reset,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file (prompts unless --yes)
    Init,

    /// Display current configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

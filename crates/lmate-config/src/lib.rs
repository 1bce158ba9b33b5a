//! Shared configuration for L-Mate tools.
//!
//! TOML profiles, environment overlay, and translation to
//! `lmate_core::DashboardConfig`. The CLI adds `GlobalOpts`-aware
//! overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lmate_core::{DashboardConfig, Environment};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_SERIAL: &str = "DEMO-123";
pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Bounded wait per backend call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout_ms() -> u64 {
    4_000
}

/// A named device profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "http://10.0.0.5:8080/api").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Device serial.
    #[serde(default = "default_serial")]
    pub serial: String,

    /// Override the bounded wait per call.
    pub timeout_ms: Option<u64>,

    /// Provisioning cadence; 0 disables it.
    pub provisioning_interval_ms: Option<u64>,

    /// Metrics cadence; 0 disables it.
    pub metrics_interval_ms: Option<u64>,

    /// Samples kept per metric.
    pub history_len: Option<usize>,

    /// Initial onboarding environment.
    pub environment: Option<Environment>,

    /// Accept self-signed backend certificates.
    pub insecure: Option<bool>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            serial: default_serial(),
            timeout_ms: None,
            provisioning_interval_ms: None,
            metrics_interval_ms: None,
            history_len: None,
            environment: None,
            insecure: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_serial() -> String {
    DEFAULT_SERIAL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "lmate", "lmate").map_or_else(
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
    p.push("lmate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `LMATE_` variables.
///
/// Nested keys use a double underscore, e.g.
/// `LMATE_DEFAULTS__TIMEOUT_MS=2000`.
fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LMATE_").split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
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

// ── Resolution ──────────────────────────────────────────────────────

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> String {
        self.default_profile
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    /// The named profile, or built-in defaults if it does not exist.
    pub fn profile_or_default(&self, name: &str) -> Profile {
        self.profiles.get(name).cloned().unwrap_or_default()
    }
}

/// Build a `DashboardConfig` from a profile; global `defaults` fill gaps.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let url: url::Url = profile
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {}", profile.base_url),
        })?;

    if profile.serial.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "serial".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut cfg = DashboardConfig::new(url, profile.serial.clone());
    cfg.timeout = Duration::from_millis(profile.timeout_ms.unwrap_or(defaults.timeout_ms));
    if cfg.timeout.is_zero() {
        return Err(ConfigError::Validation {
            field: "timeout_ms".into(),
            reason: "must be greater than 0".into(),
        });
    }
    if let Some(ms) = profile.provisioning_interval_ms {
        cfg.provisioning_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = profile.metrics_interval_ms {
        cfg.metrics_interval = Duration::from_millis(ms);
    }
    if let Some(len) = profile.history_len {
        if len == 0 {
            return Err(ConfigError::Validation {
                field: "history_len".into(),
                reason: "must be at least 1".into(),
            });
        }
        cfg.history_len = len;
    }
    if let Some(env) = profile.environment {
        cfg.environment = env;
    }
    cfg.accept_invalid_certs = profile.insecure.unwrap_or(false);
    Ok(cfg)
}

//! Shared configuration for the netwatch dashboard.
//!
//! TOML config file merged with `NETWATCH_`-prefixed environment variables,
//! and translation to `netwatch_core::DashboardConfig`. The TUI binary
//! resolves CLI flags on top of what this crate loads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netwatch_core::DashboardConfig;

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
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL (e.g. `http://192.168.1.50:5000`).
    #[serde(default = "default_server")]
    pub server: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll periods, overridable per domain.
    #[serde(default)]
    pub poll: PollIntervals,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout: default_timeout(),
            poll: PollIntervals::default(),
        }
    }
}

/// Poll periods in seconds.
#[derive(Debug, Deserialize, Serialize)]
pub struct PollIntervals {
    #[serde(default = "default_metrics_secs")]
    pub metrics: u64,
    #[serde(default = "default_ping_secs")]
    pub ping: u64,
    #[serde(default = "default_services_secs")]
    pub services: u64,
    #[serde(default = "default_notifications_secs")]
    pub notifications: u64,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            metrics: default_metrics_secs(),
            ping: default_ping_secs(),
            services: default_services_secs(),
            notifications: default_notifications_secs(),
        }
    }
}

fn default_server() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_metrics_secs() -> u64 {
    2
}
fn default_ping_secs() -> u64 {
    5
}
fn default_services_secs() -> u64 {
    10
}
fn default_notifications_secs() -> u64 {
    5
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "netwatch", "netwatch").map_or_else(
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
    p.push("netwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from an explicit file path + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETWATCH_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write to an explicit path.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `DashboardConfig` from the loaded file config.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    let url: url::Url = cfg.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", cfg.server),
    })?;

    for (field, secs) in [
        ("poll.metrics", cfg.poll.metrics),
        ("poll.ping", cfg.poll.ping),
        ("poll.services", cfg.poll.services),
        ("poll.notifications", cfg.poll.notifications),
    ] {
        if secs == 0 {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: "poll period must be at least 1 second".into(),
            });
        }
    }

    Ok(DashboardConfig {
        url,
        timeout: Duration::from_secs(cfg.timeout),
        metrics_interval: Duration::from_secs(cfg.poll.metrics),
        ping_interval: Duration::from_secs(cfg.poll.ping),
        services_interval: Duration::from_secs(cfg.poll.services),
        notifications_interval: Duration::from_secs(cfg.poll.notifications),
        ..DashboardConfig::default()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_dashboard_cadence() {
        let cfg = Config::default();
        assert_eq!(cfg.poll.metrics, 2);
        assert_eq!(cfg.poll.ping, 5);
        assert_eq!(cfg.poll.services, 10);
        assert_eq!(cfg.poll.notifications, 5);
    }

    #[test]
    fn load_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.server = "http://10.0.0.2:5000".into();
        cfg.poll.metrics = 3;
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.server, "http://10.0.0.2:5000");
        assert_eq!(loaded.poll.metrics, 3);
        // Untouched fields keep their defaults.
        assert_eq!(loaded.poll.services, 10);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.server, "http://127.0.0.1:5000");
    }

    #[test]
    fn translation_rejects_bad_url_and_zero_period() {
        let mut cfg = Config::default();
        cfg.server = "not a url".into();
        assert!(matches!(
            to_dashboard_config(&cfg),
            Err(ConfigError::Validation { .. })
        ));

        let mut cfg = Config::default();
        cfg.poll.ping = 0;
        assert!(matches!(
            to_dashboard_config(&cfg),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn translation_carries_periods() {
        let cfg = Config::default();
        let dash = to_dashboard_config(&cfg).unwrap();
        assert_eq!(dash.metrics_interval, Duration::from_secs(2));
        assert_eq!(dash.notifications_interval, Duration::from_secs(5));
        assert_eq!(dash.network_window, 30);
        assert_eq!(dash.ping_window, 20);
    }
}

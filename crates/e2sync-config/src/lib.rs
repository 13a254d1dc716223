//! Shared configuration for e2sync tools.
//!
//! TOML profiles naming preset servers, layered with `E2SYNC_*`
//! environment variables, and translation to `e2sync_core::SessionConfig`.
//! The CLI applies its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use e2sync_core::SessionConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

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

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else `default_profile`.
    pub fn profile_name<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.default_profile.as_deref())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Retained event log entries; 0 keeps everything.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            log_capacity: default_log_capacity(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_log_capacity() -> usize {
    e2sync_core::DEFAULT_LOG_CAPACITY
}

/// A named preset server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g. "http://192.168.0.10:8080"). A bare
    /// `host:port` is taken as plain HTTP.
    pub server: String,

    /// Push channel endpoint; defaults to the server's HTTP port + 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_url: Option<String>,

    /// Enable the push channel for long-running commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,

    /// Sub-protocols offered on the push upgrade request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,

    /// Probe frame sent after each push open. Empty disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<String>,

    /// Override the default timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_capacity: Option<usize>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "qmsk", "e2sync").map_or_else(
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
    p.push("e2sync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, layered over defaults and under
/// `E2SYNC_*` variables (`__` separates nested keys, e.g.
/// `E2SYNC_DEFAULTS__TIMEOUT`). A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("E2SYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
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

// ── Translation ─────────────────────────────────────────────────────

/// Parse a server address, accepting a bare `host[:port]`.
pub fn parse_server_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&candidate).map_err(|e| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("expected an http(s) URL with a host, got '{raw}'"),
        }),
    }
}

/// Build a `SessionConfig` from a profile and the global defaults, with
/// the push channel as configured. No CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url = parse_server_url(&profile.server)?;
    let mut config = SessionConfig::new(url);

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.event_log_capacity = profile.log_capacity.unwrap_or(defaults.log_capacity);

    config.push.enabled = profile.push.unwrap_or(true);
    config.push.protocols.clone_from(&profile.protocols);
    if let Some(ping) = &profile.ping {
        config.push.ping = if ping.is_empty() {
            None
        } else {
            Some(ping.clone())
        };
    }
    if let Some(raw) = &profile.push_url {
        let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
            field: "push_url".into(),
            reason: format!("invalid URL '{raw}': {e}"),
        })?;
        config.push.url = Some(url);
    }

    Ok(config)
}

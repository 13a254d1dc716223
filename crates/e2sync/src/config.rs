//! CLI configuration: thin wrapper around `e2sync_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --timeout, --push-url, --no-push).

use std::path::PathBuf;
use std::time::Duration;

use e2sync_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use e2sync_config::{
    Config, Profile, config_path, load_config_from, parse_server_url, profile_to_session_config,
    save_config_to,
};

/// The config file in effect: `--config`, else the platform default.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&effective_path(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config
        .profile_name(global.profile.as_deref())
        .unwrap_or("default")
        .to_owned()
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over the profile. Without a profile, `--server` alone is
/// enough; an explicitly requested profile must exist.
pub fn resolve_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load(global)?;
    let name = active_profile_name(global, &cfg);

    let mut session = match (cfg.profiles.get(&name), &global.server) {
        (Some(profile), _) => profile_to_session_config(profile, &cfg.defaults)?,
        (None, _) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            });
        }
        (None, Some(server)) => {
            let mut session = SessionConfig::new(parse_server_url(server)?);
            session.timeout = Duration::from_secs(cfg.defaults.timeout);
            session.event_log_capacity = cfg.defaults.log_capacity;
            session
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: effective_path(global).display().to_string(),
            });
        }
    };

    if let Some(server) = &global.server {
        session.url = parse_server_url(server)?;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    if let Some(raw) = &global.push_url {
        let url = url::Url::parse(raw).map_err(|e| CliError::Validation {
            field: "push-url".into(),
            reason: format!("invalid URL '{raw}': {e}"),
        })?;
        session.push.url = Some(url);
    }
    if global.no_push {
        session.push.enabled = false;
    }

    Ok(session)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

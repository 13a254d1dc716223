// ── Session configuration ──
//
// Runtime settings for a `Session`. Built by the CLI from profiles and
// flags; the core never reads files or the environment itself.

use std::time::Duration;

use e2sync_api::push::push_url_for;
use e2sync_api::{PushConfig, ReconnectConfig, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// Default bound on retained event log entries.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Configuration for connecting to one preset server.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HTTP base URL of the server, e.g. `http://10.0.0.5:8080/`.
    pub url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    pub push: PushSettings,
    /// Retained event log entries; `0` keeps everything.
    pub event_log_capacity: usize,
}

/// Push channel settings.
#[derive(Debug, Clone)]
pub struct PushSettings {
    pub enabled: bool,
    /// Explicit endpoint; derived from the HTTP URL when unset.
    pub url: Option<Url>,
    pub protocols: Vec<String>,
    pub ping: Option<String>,
    pub reconnect: ReconnectConfig,
}

impl Default for PushSettings {
    fn default() -> Self {
        let defaults = PushConfig::default();
        Self {
            enabled: true,
            url: None,
            protocols: defaults.protocols,
            ping: defaults.ping,
            reconnect: defaults.reconnect,
        }
    }
}

impl SessionConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: TransportConfig::default().timeout,
            push: PushSettings::default(),
            event_log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }

    /// The push endpoint: the explicit one, or HTTP port + 1.
    pub fn push_url(&self) -> Result<Url, CoreError> {
        match &self.push.url {
            Some(url) => Ok(url.clone()),
            None => push_url_for(&self.url).map_err(|e| CoreError::Config {
                message: e.to_string(),
            }),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(self.timeout)
    }

    pub(crate) fn push_config(&self) -> PushConfig {
        PushConfig {
            reconnect: self.push.reconnect.clone(),
            protocols: self.push.protocols.clone(),
            ping: self.push.ping.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::new(Url::parse("http://e2.local:8080/").unwrap());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.event_log_capacity, DEFAULT_LOG_CAPACITY);
        assert!(config.push.enabled);
        assert!(config.push.reconnect.max_retries.is_none());
    }

    #[test]
    fn push_url_derived_or_explicit() {
        let mut config = SessionConfig::new(Url::parse("https://e2.local:8443/").unwrap());
        assert_eq!(config.push_url().unwrap().as_str(), "wss://e2.local:8444/");

        config.push.url = Some(Url::parse("ws://other:9000/events").unwrap());
        assert_eq!(config.push_url().unwrap().as_str(), "ws://other:9000/events");
    }
}

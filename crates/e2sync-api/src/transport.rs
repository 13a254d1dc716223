// Shared transport configuration for building reqwest::Client instances.
//
// The API client never retries; the timeout configured here is the only
// bound on a request, and hitting it surfaces as a transport failure.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("e2sync/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Config with the given request timeout and default user agent.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| Error::Client(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("e2sync/"));
    }

    #[test]
    fn with_timeout_overrides_only_timeout() {
        let config = TransportConfig::with_timeout(Duration::from_secs(3));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, TransportConfig::default().user_agent);
    }
}

//! Push notification channel with auto-reconnect.
//!
//! Connects to the preset server's WebSocket notification endpoint and
//! surfaces the connection lifecycle as [`PushEvent`]s through a
//! [`tokio::sync::broadcast`] channel. Message payloads are passed through
//! verbatim and never interpreted: any message only means "state may have
//! changed". Reconnection uses exponential backoff with jitter and, by
//! default, never gives up.
//!
//! # Example
//!
//! ```rust,ignore
//! use e2sync_api::push::{PushConfig, PushEvent, PushHandle};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("ws://10.0.0.5:8082/")?;
//!
//! let (handle, mut rx) = PushHandle::spawn(url, PushConfig::default(), cancel.clone());
//!
//! while let Ok(event) = rx.recv().await {
//!     if matches!(event, PushEvent::Opened | PushEvent::Message(_)) {
//!         // re-fetch the full state
//!     }
//! }
//!
//! handle.shutdown();
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Frame the original web client emitted right after the socket opened.
pub const DEFAULT_PING: &str = r#"{"event":"ping","data":"hello"}"#;

// ── Events & state ───────────────────────────────────────────────────

/// Observable lifecycle event of the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// A connection was (re-)established.
    Opened,
    /// The server pushed something. The payload carries no contract.
    Message(String),
    /// The connection dropped, or a connection attempt failed.
    Closed { reason: Option<String> },
}

/// Transport-level connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

// ── Configuration ────────────────────────────────────────────────────

/// Exponential backoff configuration for reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum consecutive failed attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

/// Push channel settings.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub reconnect: ReconnectConfig,

    /// Sub-protocols offered on the upgrade request. Empty by default;
    /// some servers refuse a handshake that names a protocol they don't speak.
    pub protocols: Vec<String>,

    /// Text frame sent once after every successful open, as a liveness
    /// probe. No reply is expected.
    pub ping: Option<String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectConfig::default(),
            protocols: Vec::new(),
            ping: Some(DEFAULT_PING.into()),
        }
    }
}

/// Derive the conventional push endpoint from the HTTP base URL:
/// same host, HTTP port + 1, `ws`/`wss` scheme.
pub fn push_url_for(base: &Url) -> Result<Url, Error> {
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    let host = base
        .host_str()
        .ok_or_else(|| Error::PushConnect(format!("no host in {base}")))?;
    let port = base
        .port_or_known_default()
        .and_then(|p| p.checked_add(1))
        .ok_or_else(|| Error::PushConnect(format!("cannot derive push port from {base}")))?;

    Ok(Url::parse(&format!("{scheme}://{host}:{port}/"))?)
}

// ── PushHandle ───────────────────────────────────────────────────────

/// Handle to a running push channel.
///
/// Call [`shutdown`](Self::shutdown) (or cancel the token passed to
/// [`spawn`](Self::spawn)) to tear down the background task.
pub struct PushHandle {
    event_tx: broadcast::Sender<PushEvent>,
    state_rx: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl PushHandle {
    /// Spawn the connection loop.
    ///
    /// Returns immediately together with a receiver created before the
    /// task starts, so the first `Opened` can never be missed. The first
    /// connection attempt happens asynchronously.
    pub fn spawn(
        url: Url,
        config: PushConfig,
        cancel: CancellationToken,
    ) -> (Self, broadcast::Receiver<PushEvent>) {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Closed);

        let task_tx = event_tx.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            push_loop(url, config, task_tx, state_tx, task_cancel).await;
        });

        (
            Self {
                event_tx,
                state_rx,
                cancel,
            },
            event_rx,
        )
    }

    /// Get an additional receiver for the event stream.
    ///
    /// Only events sent after this call are delivered. If a consumer falls
    /// behind, it receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.event_tx.subscribe()
    }

    /// Observe the connection state.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → report close → backoff → reconnect.
async fn push_loop(
    url: Url,
    config: PushConfig,
    event_tx: broadcast::Sender<PushEvent>,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    while !cancel.is_cancelled() {
        let _ = state_tx.send(ConnectionState::Connecting);

        let result = connect_and_read(&url, &config, &event_tx, &state_tx, &cancel).await;

        let _ = state_tx.send(ConnectionState::Closed);
        let delay = match result {
            // Clean disconnect (close frame or stream ended).
            Ok(()) => {
                let _ = event_tx.send(PushEvent::Closed { reason: None });
                if cancel.is_cancelled() {
                    break;
                }
                tracing::info!("push channel closed, reconnecting");
                attempt = 0;
                config.reconnect.initial_delay
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "push channel error");
                let _ = event_tx.send(PushEvent::Closed {
                    reason: Some(e.to_string()),
                });

                if let Some(max) = config.reconnect.max_retries {
                    if attempt >= max {
                        tracing::error!(max_retries = max, "push reconnection limit reached, giving up");
                        break;
                    }
                }

                let delay = calculate_backoff(attempt, &config.reconnect);
                attempt = attempt.saturating_add(1);
                delay
            }
        };

        tracing::debug!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    tracing::debug!("push loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish a single connection and read frames until it drops.
///
/// Emits `Opened` once the handshake completes; the caller reports the
/// matching `Closed`.
async fn connect_and_read(
    url: &Url,
    config: &PushConfig,
    event_tx: &broadcast::Sender<PushEvent>,
    state_tx: &watch::Sender<ConnectionState>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting push channel");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::PushConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    for protocol in &config.protocols {
        request = request.with_sub_protocol(protocol.clone());
    }

    let connect = tokio_tungstenite::connect_async(request);
    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        result = connect => result.map_err(|e| Error::PushConnect(e.to_string()))?,
    };

    tracing::info!("push channel opened");
    let _ = state_tx.send(ConnectionState::Open);
    let _ = event_tx.send(PushEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    if let Some(ref ping) = config.ping {
        if let Err(e) = write.send(tungstenite::Message::Text(ping.clone().into())).await {
            tracing::debug!(error = %e, "liveness probe not sent");
        }
    }

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        tracing::trace!(len = text.len(), "push message");
                        let _ = event_tx.send(PushEvent::Message(text.as_str().to_owned()));
                    }
                    Some(Ok(tungstenite::Message::Binary(data))) => {
                        let payload = String::from_utf8_lossy(&data).into_owned();
                        let _ = event_tx.send(PushEvent::Message(payload));
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "push close frame received");
                        } else {
                            tracing::info!("push close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::PushConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("push stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Ping, Pong, Frame -- tungstenite answers pings itself
                    }
                }
            }
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(32)).unwrap_or(32);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_retries_forever_with_hello_ping() {
        let config = PushConfig::default();
        assert_eq!(config.reconnect.initial_delay, Duration::from_secs(1));
        assert_eq!(config.reconnect.max_delay, Duration::from_secs(30));
        assert!(config.reconnect.max_retries.is_none());
        assert!(config.protocols.is_empty());
        assert_eq!(config.ping.as_deref(), Some(DEFAULT_PING));
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        // With jitter factor up to 1.25, max effective is 12.5s
        for attempt in [10, 100, u32::MAX] {
            let delay = calculate_backoff(attempt, &config);
            assert!(
                delay <= Duration::from_secs(13),
                "delay at attempt {attempt} ({delay:?}) should be capped near max_delay"
            );
        }
    }

    #[test]
    fn push_url_uses_next_port() {
        let base = Url::parse("http://10.0.0.5:8081/").unwrap();
        assert_eq!(push_url_for(&base).unwrap().as_str(), "ws://10.0.0.5:8082/");
    }

    #[test]
    fn push_url_from_default_ports() {
        let http = Url::parse("http://e2.local/").unwrap();
        assert_eq!(push_url_for(&http).unwrap().as_str(), "ws://e2.local:81/");

        let https = Url::parse("https://e2.local/").unwrap();
        assert_eq!(push_url_for(&https).unwrap().as_str(), "wss://e2.local:444/");
    }

    #[test]
    fn push_url_rejects_port_overflow() {
        let base = Url::parse("http://e2.local:65535/").unwrap();
        assert!(matches!(push_url_for(&base), Err(Error::PushConnect(_))));
    }
}

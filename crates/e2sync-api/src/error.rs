use thiserror::Error;

/// Top-level error type for the `e2sync-api` crate.
///
/// Covers both transport surfaces: the request/response HTTP API and the
/// push notification channel. `e2sync-core` maps these into its own
/// taxonomy (transport failure vs. application-level rejection).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    // ── Server replies ──────────────────────────────────────────────
    /// The server answered with a non-success status.
    ///
    /// For command submissions this is how a stale `seq` or an unsafe
    /// switcher state is reported; `message` holds the response body.
    #[error("Server rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Push channel ────────────────────────────────────────────────
    /// Push channel connection failed or dropped with an error.
    #[error("Push channel connection failed: {0}")]
    PushConnect(String),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::PushConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the server itself answered and refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

use thiserror::Error;

/// Why the server refused a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    /// The quoted `seq` no longer matches the server.
    StaleSequence,
    /// The switcher is not in a safe state for the transition.
    Unsafe,
    Other,
}

impl RejectReason {
    /// Classify a rejection from its status code and body text.
    pub fn classify(status: u16, message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        match status {
            409 | 412 => Self::StaleSequence,
            403 | 423 => Self::Unsafe,
            _ if lower.contains("seq") => Self::StaleSequence,
            _ if lower.contains("safe") => Self::Unsafe,
            _ => Self::Other,
        }
    }
}

/// Unified error type for the sync core.
///
/// Transport failures (server unreachable, timed out, garbled reply) are
/// kept apart from rejections, where the server answered and said no.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot reach server: {message}")]
    Transport { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Rejected by server ({reason}, HTTP {status}): {message}")]
    Rejected {
        reason: RejectReason,
        status: u16,
        message: String,
    },

    #[error("Invalid response from server: {message}")]
    InvalidResponse { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session is shut down")]
    ShutDown,
}

impl CoreError {
    /// The request never produced a usable server answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout { .. } | Self::InvalidResponse { .. }
        )
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl From<e2sync_api::Error> for CoreError {
    fn from(err: e2sync_api::Error) -> Self {
        match err {
            e2sync_api::Error::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            e2sync_api::Error::PushConnect(message) => CoreError::Transport { message },
            e2sync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            e2sync_api::Error::Rejected { status, message } => CoreError::Rejected {
                reason: RejectReason::classify(status, &message),
                status,
                message,
            },
            e2sync_api::Error::Deserialization { message, .. } => {
                CoreError::InvalidResponse { message }
            }
            e2sync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            e2sync_api::Error::Client(message) => CoreError::Config { message },
        }
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use e2sync_config::ConfigError;
use e2sync_core::{CoreError, RejectReason};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the preset server")]
    #[diagnostic(
        code(e2sync::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {message}"
        )
    )]
    ConnectionFailed { message: String },

    #[error("Invalid response from the preset server: {message}")]
    #[diagnostic(
        code(e2sync::invalid_response),
        help("Is --server pointing at the preset server's HTTP port?")
    )]
    InvalidResponse { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(e2sync::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Commands ─────────────────────────────────────────────────────
    #[error("Server rejected the command (HTTP {status}): {message}")]
    #[diagnostic(code(e2sync::rejected), help("{hint}"))]
    Rejected {
        status: u16,
        message: String,
        hint: String,
    },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(e2sync::not_found),
        help("Run: e2sync {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(e2sync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(e2sync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: e2sync config init --url <URL> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(e2sync::no_config),
        help(
            "Pass --server <URL>, or create a profile with: e2sync config init --url <URL>\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(e2sync::config))]
    Config(Box<ConfigError>),

    #[error("Session ended before the operation completed")]
    #[diagnostic(code(e2sync::shut_down))]
    ShutDown,

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(e2sync::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(e2sync::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::InvalidResponse { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport { message } => CliError::ConnectionFailed { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },
            CoreError::Rejected {
                reason,
                status,
                message,
            } => CliError::Rejected {
                status,
                message,
                hint: rejection_hint(reason).into(),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::ShutDown => CliError::ShutDown,
        }
    }
}

fn rejection_hint(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::StaleSequence => {
            "Server state changed since it was last read. State has been refreshed; retry the command."
        }
        RejectReason::Unsafe => {
            "The switcher is not in a safe state for this command. Check `e2sync status`."
        }
        RejectReason::Other => "State has been refreshed. Check `e2sync status` before retrying.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::Transport {
                    message: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 10 }, exit_code::TIMEOUT),
            (
                CoreError::Rejected {
                    reason: RejectReason::StaleSequence,
                    status: 409,
                    message: "seq".into(),
                },
                exit_code::REJECTED,
            ),
            (CoreError::ShutDown, exit_code::GENERAL),
        ];

        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn config_validation_is_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "server".into(),
            reason: "bad".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}

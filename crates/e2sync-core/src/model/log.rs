use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// What a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogKind {
    PushOpened,
    PushMessage,
    PushClosed,
    RefreshStarted,
    RefreshApplied,
    RefreshSuperseded,
    RefreshFailed,
    CommandSubmitted,
    CommandAccepted,
    CommandRejected,
    CommandFailed,
}

impl LogKind {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::RefreshFailed | Self::CommandRejected | Self::CommandFailed
        )
    }
}

/// Timestamped diagnostic record of a significant event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub kind: LogKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(LogKind::RefreshApplied.to_string(), "refresh_applied");
        assert_eq!(LogKind::from_str("push_closed").ok(), Some(LogKind::PushClosed));
    }

    #[test]
    fn failure_kinds() {
        assert!(LogKind::CommandRejected.is_failure());
        assert!(!LogKind::PushMessage.is_failure());
    }
}

// ── Command types ──

use std::fmt;

use serde::Serialize;

use crate::model::PresetId;

/// A user intent that mutates server state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "preset", rename_all = "snake_case")]
pub enum Command {
    /// Select a preset.
    ActivatePreset(PresetId),
    /// Immediate transition.
    Cut,
    /// Automatic (timed) transition.
    Autotrans,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ActivatePreset(_) => "preset",
            Self::Cut => "cut",
            Self::Autotrans => "autotrans",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActivatePreset(id) => write!(f, "activate preset {id}"),
            Self::Cut => f.write_str("cut"),
            Self::Autotrans => f.write_str("autotrans"),
        }
    }
}

/// A command bound to the sequence it was submitted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedCommand {
    pub command: Command,
    pub expected_sequence: u64,
}

/// Server acknowledgement of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandAck {
    pub command: Command,
    /// Sequence the command was submitted against.
    pub expected_sequence: u64,
    /// Sequence the server reported after applying it.
    pub sequence: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_and_name() {
        let cmd = Command::ActivatePreset(PresetId::from("1.2"));
        assert_eq!(cmd.to_string(), "activate preset 1.2");
        assert_eq!(cmd.name(), "preset");
        assert_eq!(Command::Autotrans.name(), "autotrans");
    }

    #[test]
    fn serializes_tagged() {
        let ack = CommandAck {
            command: Command::ActivatePreset(PresetId::from("3")),
            expected_sequence: 5,
            sequence: 6,
        };
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({
                "command": { "command": "activate_preset", "preset": "3" },
                "expected_sequence": 5,
                "sequence": 6
            })
        );
        assert_eq!(
            serde_json::to_value(Command::Cut).unwrap(),
            json!({ "command": "cut" })
        );
    }
}

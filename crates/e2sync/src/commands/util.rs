//! Shared helpers for command handlers.

use chrono::{DateTime, Local, Utc};
use e2sync_core::{Preset, PresetId, Snapshot};

use crate::error::CliError;

/// Look up a preset in the refreshed snapshot.
pub fn resolve_preset<'a>(snapshot: &'a Snapshot, identifier: &str) -> Result<&'a Preset, CliError> {
    snapshot
        .preset(&PresetId::from(identifier))
        .ok_or_else(|| CliError::NotFound {
            resource_type: "preset".into(),
            identifier: identifier.into(),
            list_command: "presets".into(),
        })
}

/// Short local wall-clock time for streamed output.
pub fn clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

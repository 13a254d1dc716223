// ── Domain model ──
//
// Client-side view of the preset server state, decoupled from the wire
// format in `e2sync-api`.

pub mod log;
pub mod preset;
pub mod snapshot;
pub mod source;

pub use log::{LogEntry, LogKind};
pub use preset::{Preset, PresetGroup, PresetId};
pub use snapshot::Snapshot;
pub use source::{Source, SourceListing};

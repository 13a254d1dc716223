// e2sync-core: client-side state synchronization for qmsk.e2 presets
//
// A `Session` keeps a local snapshot of the preset server consistent with
// the server: every push channel event triggers a full refresh, commands
// carry the server's sequence for optimistic concurrency, and any command
// failure is followed by a refresh.

pub mod command;
pub mod config;
mod convert;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod stream;
pub mod sync;

pub use command::{Command, CommandAck, SubmittedCommand};
pub use config::{DEFAULT_LOG_CAPACITY, PushSettings, SessionConfig};
pub use dispatch::Dispatcher;
pub use error::{CoreError, RejectReason};
pub use model::{
    LogEntry, LogKind, Preset, PresetGroup, PresetId, Snapshot, Source, SourceListing,
};
pub use session::Session;
pub use store::{EventLog, StateStore};
pub use stream::{SnapshotStream, SnapshotWatchStream};
pub use sync::{RefreshOutcome, SyncClient};

pub use e2sync_api::{ConnectionState, PushEvent, ReconnectConfig};

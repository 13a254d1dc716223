// ── Client-side stores ──

mod event_log;
mod state_store;

pub use event_log::EventLog;
pub use state_store::StateStore;

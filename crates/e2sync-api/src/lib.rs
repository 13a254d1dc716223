// e2sync-api: Async transport adapters for the qmsk.e2 preset server (HTTP + push)

pub mod client;
pub mod error;
pub mod models;
pub mod push;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{PresetMeta, SeqResponse, SourcesResponse, StateResponse, TransitionRequest};
pub use push::{ConnectionState, PushConfig, PushEvent, PushHandle, ReconnectConfig};
pub use transport::TransportConfig;

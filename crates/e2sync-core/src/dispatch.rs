// ── Command dispatcher ──
//
// Submits commands against the current sequence. On success the store
// takes the acknowledged sequence and refreshes already in flight can no
// longer lower it; on any failure a refresh runs before the error is
// returned, so the next attempt quotes a fresh sequence.

use std::sync::Arc;

use e2sync_api::{ApiClient, TransitionRequest};
use serde_json::json;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::{Command, CommandAck, SubmittedCommand};
use crate::error::CoreError;
use crate::model::LogKind;
use crate::store::{EventLog, StateStore};
use crate::sync::SyncClient;

pub struct Dispatcher {
    api: ApiClient,
    store: Arc<StateStore>,
    log: Arc<EventLog>,
    sync: SyncClient,
    cancel: CancellationToken,
    /// Held for the whole submit, recovery refresh included.
    in_flight: Mutex<()>,
}

impl Dispatcher {
    pub fn new(
        api: ApiClient,
        store: Arc<StateStore>,
        log: Arc<EventLog>,
        sync: SyncClient,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            store,
            log,
            sync,
            cancel,
            in_flight: Mutex::new(()),
        }
    }

    /// Submit a command and wait for the server's answer.
    ///
    /// Submissions are serialized: a second caller waits until the first
    /// one, including its recovery refresh, has finished.
    pub async fn submit(&self, command: Command) -> Result<CommandAck, CoreError> {
        let _in_flight = self.in_flight.lock().await;
        if self.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        let submitted = SubmittedCommand {
            command,
            expected_sequence: self.store.sequence(),
        };
        let seq = submitted.expected_sequence;
        self.log.record(
            LogKind::CommandSubmitted,
            format!("{} click", submitted.command.name()),
            Some(json!({ "command": submitted.command, "seq": seq })),
        );

        let result = match &submitted.command {
            Command::ActivatePreset(id) => self.api.activate_preset(id.as_str(), seq).await,
            Command::Cut => self.api.transition(&TransitionRequest::cut(seq)).await,
            Command::Autotrans => self.api.transition(&TransitionRequest::autotrans(seq)).await,
        };

        if self.cancel.is_cancelled() {
            debug!(command = %submitted.command, "session shut down, discarding command reply");
            return Err(CoreError::ShutDown);
        }

        match result {
            Ok(resp) => {
                self.sync.record_ack(resp.seq);
                self.log.record(
                    LogKind::CommandAccepted,
                    format!("{} success", submitted.command.name()),
                    Some(json!({ "command": submitted.command, "seq": resp.seq })),
                );
                Ok(CommandAck {
                    command: submitted.command,
                    expected_sequence: seq,
                    sequence: resp.seq,
                })
            }
            Err(e) => {
                let err = CoreError::from(e);
                let (kind, data) = match &err {
                    CoreError::Rejected { reason, status, .. } => (
                        LogKind::CommandRejected,
                        json!({
                            "command": submitted.command,
                            "seq": seq,
                            "status": status,
                            "reason": reason.to_string(),
                            "error": err.to_string(),
                        }),
                    ),
                    _ => (
                        LogKind::CommandFailed,
                        json!({ "command": submitted.command, "seq": seq, "error": err.to_string() }),
                    ),
                };
                self.log.record(
                    kind,
                    format!("{} error", submitted.command.name()),
                    Some(data),
                );

                if let Err(refresh_err) = self.sync.refresh().await {
                    debug!(error = %refresh_err, "recovery refresh failed");
                }
                Err(err)
            }
        }
    }
}

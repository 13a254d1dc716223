// ── Sync client ──
//
// Keeps the StateStore aligned with the server. Every push channel open or
// message triggers a full refresh; responses are applied in issue order so
// a slow, older refresh can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use e2sync_api::{ApiClient, ConnectionState, PushEvent};
use serde_json::json;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{LogKind, Snapshot, SourceListing};
use crate::store::{EventLog, StateStore};

/// What happened to a completed refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the snapshot.
    Applied { sequence: u64 },
    /// A refresh issued later had already been applied; this one was dropped.
    Superseded,
    /// The session shut down while the request was in flight.
    Discarded,
}

#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    api: ApiClient,
    store: Arc<StateStore>,
    log: Arc<EventLog>,
    cancel: CancellationToken,
    connection: watch::Sender<ConnectionState>,
    /// Last ticket handed out; tickets start at 1.
    next_ticket: AtomicU64,
    tickets: Mutex<Tickets>,
}

/// Ordering state for store writes. Refreshes and command acks draw from
/// the same ticket counter.
#[derive(Debug, Default)]
struct Tickets {
    /// Ticket of the refresh whose response is currently in the store.
    applied: u64,
    /// Ticket drawn by the latest accepted command ack.
    acked: u64,
}

impl SyncClient {
    pub fn new(
        api: ApiClient,
        store: Arc<StateStore>,
        log: Arc<EventLog>,
        cancel: CancellationToken,
    ) -> Self {
        let (connection, _) = watch::channel(ConnectionState::Closed);
        Self {
            inner: Arc::new(SyncInner {
                api,
                store,
                log,
                cancel,
                connection,
                next_ticket: AtomicU64::new(0),
                tickets: Mutex::new(Tickets::default()),
            }),
        }
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    /// Push channel state as last reported to this client.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }

    pub(crate) fn set_connection_state(&self, state: ConnectionState) {
        self.inner.connection.send_replace(state);
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch the full state and replace the snapshot.
    ///
    /// Failures are logged and returned; the store keeps its previous
    /// snapshot. Nothing is retried here: the next push event or command
    /// failure triggers another refresh.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.log.record(
            LogKind::RefreshStarted,
            "presets load",
            Some(json!({ "ticket": ticket })),
        );

        let result = self.inner.api.get_state().await;

        if self.inner.cancel.is_cancelled() {
            debug!(ticket, "session shut down, discarding refresh response");
            return Ok(RefreshOutcome::Discarded);
        }

        let state = match result {
            Ok(state) => state,
            Err(e) => {
                let err = CoreError::from(e);
                self.inner.log.record(
                    LogKind::RefreshFailed,
                    "presets error",
                    Some(json!({ "ticket": ticket, "error": err.to_string() })),
                );
                return Err(err);
            }
        };

        let snapshot = Snapshot::from(state);
        let sequence = snapshot.sequence;
        let presets = snapshot.presets.len();

        {
            let mut tickets = self
                .inner
                .tickets
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // A refresh issued before an accepted ack may carry state older
            // than the ack; it must not move the sequence backwards.
            let stale = tickets.applied > ticket
                || (tickets.acked > ticket && sequence < self.inner.store.sequence());
            if stale {
                drop(tickets);
                self.inner.log.record(
                    LogKind::RefreshSuperseded,
                    "presets superseded",
                    Some(json!({ "ticket": ticket, "seq": sequence })),
                );
                return Ok(RefreshOutcome::Superseded);
            }
            tickets.applied = ticket;
            self.inner.store.replace(snapshot);
        }

        self.inner.log.record(
            LogKind::RefreshApplied,
            "presets update",
            Some(json!({ "ticket": ticket, "seq": sequence, "presets": presets })),
        );
        Ok(RefreshOutcome::Applied { sequence })
    }

    /// Apply the sequence from an accepted command.
    ///
    /// Draws a ticket so that refreshes issued earlier can no longer lower
    /// the sequence below the acknowledged one. Returns whether the store
    /// changed.
    pub(crate) fn record_ack(&self, sequence: u64) -> bool {
        let mut tickets = self
            .inner
            .tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tickets.acked = self.inner.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.store.advance_sequence(sequence)
    }

    /// Fetch the auxiliary sources listing. Not stored.
    pub async fn sources(&self) -> Result<SourceListing, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }
        Ok(self.inner.api.get_sources().await?.into())
    }

    // ── Push events ──────────────────────────────────────────────────

    /// React to one push channel event.
    pub async fn handle_event(&self, event: PushEvent) {
        match event {
            PushEvent::Opened => {
                self.set_connection_state(ConnectionState::Open);
                self.inner
                    .log
                    .record(LogKind::PushOpened, "websocket opened", None);
                self.refresh_logged().await;
            }
            PushEvent::Message(payload) => self.on_message(payload, 0).await,
            PushEvent::Closed { reason } => {
                self.set_connection_state(ConnectionState::Closed);
                self.inner.log.record(
                    LogKind::PushClosed,
                    "websocket closed",
                    reason.map(|r| json!({ "reason": r })),
                );
            }
        }
    }

    async fn on_message(&self, payload: String, coalesced: usize) {
        let data = if coalesced > 0 {
            json!({ "payload": payload, "coalesced": coalesced })
        } else {
            json!({ "payload": payload })
        };
        self.inner
            .log
            .record(LogKind::PushMessage, "websocket message", Some(data));
        self.refresh_logged().await;
    }

    async fn refresh_logged(&self) {
        // Failures are already in the event log.
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "refresh after push event failed");
        }
    }

    /// Consume push events until the session is cancelled or the channel
    /// closes.
    ///
    /// Messages that queue up while a refresh is in flight collapse into a
    /// single follow-up refresh. A lagged receiver is treated the same way:
    /// whatever was missed, one refresh catches up.
    pub async fn run(self, mut events: broadcast::Receiver<PushEvent>) {
        let cancel = self.inner.cancel.clone();
        let mut pending: Option<PushEvent> = None;

        loop {
            let event = if let Some(event) = pending.take() {
                event
            } else {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => event,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "push events lagged, refreshing");
                            PushEvent::Message(String::new())
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            };

            let handled = async {
                match event {
                    PushEvent::Message(payload) => {
                        let (coalesced, next) = drain_messages(&mut events);
                        pending = next;
                        self.on_message(payload, coalesced).await;
                    }
                    other => self.handle_event(other).await,
                }
            };

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = handled => {}
            }
        }

        debug!("sync loop stopped");
    }
}

/// Pull every message already queued. Returns how many were absorbed and
/// the first non-message event, which must still be handled.
fn drain_messages(events: &mut broadcast::Receiver<PushEvent>) -> (usize, Option<PushEvent>) {
    let mut absorbed = 0usize;
    loop {
        match events.try_recv() {
            Ok(PushEvent::Message(_)) => absorbed += 1,
            Ok(other) => return (absorbed, Some(other)),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                absorbed = absorbed.saturating_add(usize::try_from(skipped).unwrap_or(usize::MAX));
            }
            Err(_) => return (absorbed, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_stops_at_first_non_message() {
        let (tx, mut rx) = broadcast::channel(16);
        tx.send(PushEvent::Message("a".into())).ok();
        tx.send(PushEvent::Message("b".into())).ok();
        tx.send(PushEvent::Closed { reason: None }).ok();
        tx.send(PushEvent::Message("c".into())).ok();

        let (absorbed, next) = drain_messages(&mut rx);
        assert_eq!(absorbed, 2);
        assert_eq!(next, Some(PushEvent::Closed { reason: None }));

        let (absorbed, next) = drain_messages(&mut rx);
        assert_eq!(absorbed, 1);
        assert_eq!(next, None);
    }

    #[test]
    fn drain_counts_lagged_messages() {
        let (tx, mut rx) = broadcast::channel(2);
        for i in 0..5 {
            tx.send(PushEvent::Message(i.to_string())).ok();
        }

        let (absorbed, next) = drain_messages(&mut rx);
        assert_eq!(absorbed, 5);
        assert_eq!(next, None);
    }
}

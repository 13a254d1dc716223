// ── Event log ──
//
// Bounded, most-recent-first record of significant client events. Every
// entry is mirrored to `tracing` and broadcast to live subscribers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::model::{LogEntry, LogKind};

const BROADCAST_CAPACITY: usize = 256;

pub struct EventLog {
    entries: Mutex<VecDeque<Arc<LogEntry>>>,
    capacity: usize,
    tx: broadcast::Sender<Arc<LogEntry>>,
}

impl EventLog {
    /// Create a log retaining at most `capacity` entries; `0` means unbounded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity,
            tx,
        }
    }

    pub fn record(
        &self,
        kind: LogKind,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Arc<LogEntry> {
        let entry = Arc::new(LogEntry {
            at: Utc::now(),
            kind,
            message: message.into(),
            data,
        });
        trace_entry(&entry);

        {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.push_front(entry.clone());
            if self.capacity > 0 {
                entries.truncate(self.capacity);
            }
        }

        // No live subscribers is fine.
        let _ = self.tx.send(entry.clone());
        entry
    }

    /// All retained entries, newest first.
    pub fn entries(&self) -> Vec<Arc<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn latest(&self) -> Option<Arc<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .front()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Receive entries recorded after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<LogEntry>> {
        self.tx.subscribe()
    }
}

fn trace_entry(entry: &LogEntry) {
    let kind = entry.kind;
    let data = entry.data.as_ref().map(Value::to_string).unwrap_or_default();
    match kind {
        k if k.is_failure() => warn!(kind = %k, data = %data, "{}", entry.message),
        LogKind::PushMessage | LogKind::RefreshStarted | LogKind::RefreshSuperseded => {
            debug!(kind = %kind, data = %data, "{}", entry.message);
        }
        _ => info!(kind = %kind, data = %data, "{}", entry.message),
    }
}

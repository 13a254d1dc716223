// ── State store ──
//
// Holds the latest snapshot behind a watch channel. Writers are serialized
// so a replacement and a sequence advance never interleave.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::Snapshot;
use crate::stream::SnapshotStream;

pub struct StateStore {
    snapshot: watch::Sender<Arc<Snapshot>>,
    last_replaced: watch::Sender<Option<DateTime<Utc>>>,
    write_lock: Mutex<()>,
}

impl StateStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        let (last_replaced, _) = watch::channel(None);
        Self {
            snapshot,
            last_replaced,
            write_lock: Mutex::new(()),
        }
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn sequence(&self) -> u64 {
        self.snapshot.borrow().sequence
    }

    /// Atomically swap in a new snapshot and notify subscribers.
    pub fn replace(&self, snapshot: Snapshot) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.snapshot.send_replace(Arc::new(snapshot));
        self.last_replaced.send_replace(Some(Utc::now()));
    }

    /// Record the sequence a command acknowledgement carried.
    ///
    /// Presets and `safe` are left untouched; the push channel will trigger
    /// a refresh for those. A sequence older than the current one is
    /// ignored, since a refresh has already landed newer state. Returns
    /// whether the store changed.
    pub(crate) fn advance_sequence(&self, sequence: u64) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.snapshot.send_if_modified(|current| {
            if sequence <= current.sequence {
                return false;
            }
            let mut next = (**current).clone();
            next.sequence = sequence;
            *current = Arc::new(next);
            true
        })
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    /// When the last full replacement happened.
    pub fn last_replaced(&self) -> Option<DateTime<Utc>> {
        *self.last_replaced.borrow()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

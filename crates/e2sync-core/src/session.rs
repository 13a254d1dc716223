// ── Session facade ──
//
// Owns one server connection: the stores, the sync client, the dispatcher
// and the background tasks driving them. Cheaply cloneable.

use std::sync::Arc;

use e2sync_api::{ApiClient, ConnectionState, PushHandle};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandAck};
use crate::config::SessionConfig;
use crate::dispatch::Dispatcher;
use crate::error::CoreError;
use crate::model::{LogEntry, PresetId, Snapshot, SourceListing};
use crate::store::{EventLog, StateStore};
use crate::stream::SnapshotStream;
use crate::sync::{RefreshOutcome, SyncClient};

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    store: Arc<StateStore>,
    log: Arc<EventLog>,
    sync: SyncClient,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
    push_handle: Mutex<Option<PushHandle>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    /// Build a session. No network traffic happens until [`start`](Self::start).
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.url.clone(), &config.transport())?;
        Ok(Self::with_api(config, api))
    }

    /// Build a session around an existing API client.
    pub fn with_api(config: SessionConfig, api: ApiClient) -> Self {
        let store = Arc::new(StateStore::new());
        let log = Arc::new(EventLog::new(config.event_log_capacity));
        let cancel = CancellationToken::new();
        let sync = SyncClient::new(api.clone(), store.clone(), log.clone(), cancel.clone());
        let dispatcher = Dispatcher::new(
            api,
            store.clone(),
            log.clone(),
            sync.clone(),
            cancel.clone(),
        );

        Self {
            inner: Arc::new(SessionInner {
                config,
                store,
                log,
                sync,
                dispatcher,
                cancel,
                push_handle: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the initial refresh and, if enabled, open the push channel.
    ///
    /// A failed initial refresh is logged, not returned: the push channel
    /// will retry once it opens. Only configuration problems fail here.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }

        if let Err(e) = self.inner.sync.refresh().await {
            warn!(error = %e, "initial refresh failed");
        }

        if self.inner.config.push.enabled {
            let url = self.inner.config.push_url()?;
            info!(%url, "opening push channel");

            self.inner
                .sync
                .set_connection_state(ConnectionState::Connecting);
            let (handle, events) = PushHandle::spawn(
                url,
                self.inner.config.push_config(),
                self.inner.cancel.child_token(),
            );

            let sync = self.inner.sync.clone();
            let task = tokio::spawn(sync.run(events));

            *self.inner.push_handle.lock().await = Some(handle);
            self.inner.task_handles.lock().await.push(task);
        }

        Ok(())
    }

    /// Stop background tasks. In-flight responses are discarded. Terminal.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        if let Some(handle) = self.inner.push_handle.lock().await.take() {
            handle.shutdown();
        }

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("session shut down");
    }

    /// Run `f` against a session without the push channel: one refresh,
    /// then `f`, then shutdown.
    pub async fn oneshot<F, Fut, T>(config: SessionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.push.enabled = false;

        let session = Session::new(cfg)?;
        if let Err(e) = session.refresh().await {
            session.shutdown().await;
            return Err(e);
        }
        let result = f(session.clone()).await;
        session.shutdown().await;
        result
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Operations ───────────────────────────────────────────────────

    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        self.inner.sync.refresh().await
    }

    pub async fn submit(&self, command: Command) -> Result<CommandAck, CoreError> {
        self.inner.dispatcher.submit(command).await
    }

    pub async fn activate_preset(&self, id: impl Into<PresetId>) -> Result<CommandAck, CoreError> {
        self.submit(Command::ActivatePreset(id.into())).await
    }

    pub async fn cut(&self) -> Result<CommandAck, CoreError> {
        self.submit(Command::Cut).await
    }

    pub async fn autotrans(&self) -> Result<CommandAck, CoreError> {
        self.submit(Command::Autotrans).await
    }

    pub async fn sources(&self) -> Result<SourceListing, CoreError> {
        self.inner.sync.sources().await
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    pub fn event_log(&self) -> &Arc<EventLog> {
        &self.inner.log
    }

    pub fn sync_client(&self) -> &SyncClient {
        &self.inner.sync
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.current()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Arc<LogEntry>> {
        self.inner.log.subscribe()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.sync.connection_state()
    }
}

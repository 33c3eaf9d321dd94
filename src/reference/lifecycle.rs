//! Bootstrap state machine for reference data: `Idle -> Loading -> {Ready, Failed}`.
//!
//! The lifecycle owns the only writable copy of the state. Every transition is pushed, in
//! order, to each subscriber's queue and mirrored into a watch channel for snapshot reads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::reference::data::{BootstrapError, ReferenceData, ReferenceDataBuilder};
use crate::reference::source::{DataSet, ReferenceSource};

/// Highest progress value reported before the `Ready` transition.
const MAX_PARTIAL_PROGRESS: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceDataState {
    pub phase: Phase,
    pub loading: bool,
    pub initialized: bool,
    pub error: bool,
    pub progress: f64,
}

impl ReferenceDataState {
    /// Nothing has loaded yet, so the banner shows loading at zero progress.
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            loading: true,
            initialized: false,
            error: false,
            progress: 0.0,
        }
    }

    fn loading(progress: f64) -> Self {
        Self {
            phase: Phase::Loading,
            loading: true,
            initialized: false,
            error: false,
            progress,
        }
    }

    fn ready() -> Self {
        Self {
            phase: Phase::Ready,
            loading: false,
            initialized: true,
            error: false,
            progress: 1.0,
        }
    }

    fn failed(progress: f64) -> Self {
        Self {
            phase: Phase::Failed,
            loading: false,
            initialized: false,
            error: true,
            progress,
        }
    }
}

impl Default for ReferenceDataState {
    fn default() -> Self {
        Self::idle()
    }
}

struct Inner {
    state: ReferenceDataState,
    subscribers: Vec<mpsc::UnboundedSender<ReferenceDataState>>,
    data: Option<Arc<ReferenceData>>,
    last_error: Option<BootstrapError>,
}

pub struct ReferenceDataLifecycle {
    source: Arc<dyn ReferenceSource>,
    inner: Mutex<Inner>,
    snapshot: watch::Sender<ReferenceDataState>,
}

impl ReferenceDataLifecycle {
    pub fn new(source: Arc<dyn ReferenceSource>) -> Arc<Self> {
        let (snapshot, _) = watch::channel(ReferenceDataState::idle());
        Arc::new(Self {
            source,
            inner: Mutex::new(Inner {
                state: ReferenceDataState::idle(),
                subscribers: Vec::new(),
                data: None,
                last_error: None,
            }),
            snapshot,
        })
    }

    pub fn source(&self) -> &Arc<dyn ReferenceSource> {
        &self.source
    }

    pub fn state(&self) -> ReferenceDataState {
        self.lock().state
    }

    /// The most recently loaded data. A reload keeps serving the previous snapshot until
    /// the new one replaces it, and a failed reload leaves it in place.
    pub fn data(&self) -> Option<Arc<ReferenceData>> {
        self.lock().data.clone()
    }

    pub fn last_error(&self) -> Option<BootstrapError> {
        self.lock().last_error.clone()
    }

    /// Every transition from now on, starting with the current state.
    pub fn subscribe(&self) -> UnboundedReceiverStream<ReferenceDataState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(inner.state);
        inner.subscribers.push(tx);
        UnboundedReceiverStream::new(rx)
    }

    /// Latest-value view of the state; intermediate transitions may be skipped.
    pub fn watch(&self) -> watch::Receiver<ReferenceDataState> {
        self.snapshot.subscribe()
    }

    /// Load reference data unless it is already loaded. A call made while a bootstrap is
    /// running joins that bootstrap instead of starting another.
    pub async fn initialize(self: &Arc<Self>) -> Result<Arc<ReferenceData>, BootstrapError> {
        self.run(false).await
    }

    /// Like [`initialize`](Self::initialize) but also starts a fresh bootstrap from `Ready`.
    pub async fn reload(self: &Arc<Self>) -> Result<Arc<ReferenceData>, BootstrapError> {
        self.run(true).await
    }

    async fn run(self: &Arc<Self>, force: bool) -> Result<Arc<ReferenceData>, BootstrapError> {
        if self.begin(force) {
            let lifecycle = Arc::clone(self);
            tokio::spawn(async move {
                let worker = tokio::spawn(Arc::clone(&lifecycle).bootstrap());
                if let Err(err) = worker.await {
                    warn!(error = %err, "reference bootstrap task ended abnormally");
                    lifecycle.fail(BootstrapError::Interrupted);
                }
            });
        } else {
            debug!("joining reference bootstrap already in progress or finished");
        }

        let mut watcher = self.snapshot.subscribe();
        let settled = watcher
            .wait_for(|state| state.phase.is_terminal())
            .await
            .map(|state| state.phase)
            .map_err(|_| BootstrapError::Interrupted)?;

        let inner = self.lock();
        match settled {
            Phase::Ready => inner.data.clone().ok_or(BootstrapError::Interrupted),
            _ => Err(inner.last_error.clone().unwrap_or(BootstrapError::Interrupted)),
        }
    }

    /// Move to `Loading` if a bootstrap should start. Returns false when one is already in
    /// flight or (without `force`) the data is already loaded.
    fn begin(&self, force: bool) -> bool {
        let mut inner = self.lock();
        match inner.state.phase {
            Phase::Loading => false,
            Phase::Ready if !force => false,
            _ => {
                info!(source = %self.source.describe(), "loading reference data");
                inner.last_error = None;
                self.publish(&mut inner, ReferenceDataState::loading(0.0));
                true
            }
        }
    }

    async fn bootstrap(self: Arc<Self>) {
        let mut pending: FuturesUnordered<_> = DataSet::ALL
            .into_iter()
            .map(|dataset| {
                let source = Arc::clone(&self.source);
                async move { (dataset, source.fetch(dataset).await) }
            })
            .collect();

        let mut builder = ReferenceDataBuilder::default();
        let mut completed = 0.0;
        while let Some((dataset, fetched)) = pending.next().await {
            let accepted = fetched
                .map_err(|err| BootstrapError::Fetch {
                    dataset,
                    message: err.to_string(),
                })
                .and_then(|payload| {
                    let count = payload.len();
                    builder.accept(dataset, payload).map(|()| count)
                });
            match accepted {
                Ok(count) => {
                    completed += dataset.weight();
                    debug!(%dataset, count, "reference data set loaded");
                    self.advance(completed);
                }
                Err(err) => {
                    self.fail(err);
                    return;
                }
            }
        }

        match builder.finish() {
            Ok(data) => self.succeed(data),
            Err(err) => self.fail(err),
        }
    }

    fn advance(&self, completed: f64) {
        let mut inner = self.lock();
        if inner.state.phase != Phase::Loading {
            return;
        }
        let progress = completed.min(MAX_PARTIAL_PROGRESS).max(inner.state.progress);
        self.publish(&mut inner, ReferenceDataState::loading(progress));
    }

    fn succeed(&self, data: ReferenceData) {
        let counts = data.counts();
        let mut inner = self.lock();
        inner.data = Some(Arc::new(data));
        inner.last_error = None;
        self.publish(&mut inner, ReferenceDataState::ready());
        info!(
            items = counts.items,
            bosses = counts.bosses,
            special_attacks = counts.special_attacks,
            "reference data ready"
        );
    }

    fn fail(&self, err: BootstrapError) {
        let mut inner = self.lock();
        if inner.state.phase != Phase::Loading {
            return;
        }
        warn!(error = %err, "reference data bootstrap failed");
        let progress = inner.state.progress;
        inner.last_error = Some(err);
        self.publish(&mut inner, ReferenceDataState::failed(progress));
    }

    fn publish(&self, inner: &mut Inner, next: ReferenceDataState) {
        inner.state = next;
        inner.subscribers.retain(|tx| tx.send(next).is_ok());
        self.snapshot.send_replace(next);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

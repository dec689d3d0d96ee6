//! Cache engine facade and its loop task
//!
//! `CacheEngine::spawn` wires a [`Store`], a [`SubscriptionRegistry`] and a
//! loop task owning the [`DemandMultiplexer`] and the watcher table. The loop
//! is the only writer of watcher state; after every event it recombines the
//! state and publishes it if anything changed.

use crate::combiner::{combine, CombinedState};
use crate::demand::{DemandMultiplexer, DemandSet};
use crate::error::StateError;
use crate::registry::{Registrations, SubscriptionRegistry};
use crate::source::Domain;
use crate::stats::{EngineStats, EngineStatsSnapshot};
use crate::status::{CachedEntry, LoadingStatus};
use crate::storage::SnapshotStorage;
use crate::store::Store;
use crate::subscription::Subscription;
use crate::watcher::{WatcherManager, WatcherMessage};
use config::CacheSettings;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

/// Published engine state
pub type SharedState<D> = Arc<CombinedState<<D as Domain>::Key, <D as Domain>::Value>>;

/// Handle to one running engine; cheap to clone
pub struct CacheEngine<D: Domain> {
    shared: Arc<EngineShared<D>>,
}

struct EngineShared<D: Domain> {
    name: &'static str,
    store: Arc<Store<D>>,
    registry: Arc<SubscriptionRegistry<D::Key>>,
    state: watch::Receiver<SharedState<D>>,
    stats: Arc<EngineStats>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<D: Domain> Clone for CacheEngine<D> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<D: Domain> CacheEngine<D> {
    /// Open the store under `<app_namespace>::<domain namespace>` and start the loop
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        domain: D,
        settings: &CacheSettings,
        storage: Arc<dyn SnapshotStorage>,
        app_namespace: &str,
    ) -> Self {
        let domain = Arc::new(domain);
        let name = domain.name();
        let namespace = format!("{}::{}", app_namespace, domain.namespace());
        let stats = Arc::new(EngineStats::default());

        let store = Store::open(
            domain.clone(),
            storage,
            namespace.clone(),
            settings.persist_debounce(),
            stats.clone(),
        );
        let registry = Arc::new(SubscriptionRegistry::new());

        let initial = combine(&DemandSet::default(), &HashMap::new(), store.get_all());
        let (state_tx, state_rx) = watch::channel(Arc::new(initial));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let engine_loop = EngineLoop {
            name,
            store: store.clone(),
            registrations: registry.changes(),
            multiplexer: DemandMultiplexer::new(settings.demand_debounce()),
            watchers: WatcherManager::new(domain, settings.clone(), events_tx, stats.clone()),
            events: events_rx,
            state: state_tx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(engine_loop.run());

        info!("[{}] Engine started with {} cached entries ({})", name, store.len(), namespace);

        Self {
            shared: Arc::new(EngineShared {
                name,
                store,
                registry,
                state: state_rx,
                stats,
                shutdown: shutdown_tx,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    /// Register interest in `keys` for the lifetime of the returned subscription
    pub fn subscribe(
        &self,
        keys: impl IntoIterator<Item = D::Key>,
    ) -> Subscription<D::Key, D::Value> {
        Subscription::new(
            keys.into_iter().collect(),
            self.shared.registry.clone(),
            self.shared.state.clone(),
        )
    }

    /// Latest published state of every demanded or stored key
    pub fn snapshot(&self) -> SharedState<D> {
        self.shared.state.borrow().clone()
    }

    /// Receiver of every published state change
    pub fn changes(&self) -> watch::Receiver<SharedState<D>> {
        self.shared.state.clone()
    }

    /// Entry for `key`; keys nobody demanded report `Stale` with the stored value
    pub fn get(&self, key: &D::Key) -> CachedEntry<D::Key, D::Value> {
        if let Some(entry) = self.shared.state.borrow().get(key) {
            return entry.clone();
        }
        CachedEntry {
            key: key.clone(),
            value: self.shared.store.get(key),
            status: LoadingStatus::Stale,
        }
    }

    pub fn store(&self) -> &Arc<Store<D>> {
        &self.shared.store
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Stop every watcher, wait for the loop to exit and write the snapshot
    pub async fn shutdown(&self) -> Result<(), StateError> {
        let _ = self.shared.shutdown.send(true);

        let task = self.shared.task.lock().take();
        if let Some(task) = task {
            task.await
                .map_err(|err| StateError::EngineTask(err.to_string()))?;
        }

        let store = self.shared.store.clone();
        tokio::task::spawn_blocking(move || store.flush())
            .await
            .map_err(|err| StateError::EngineTask(err.to_string()))??;
        info!("[{}] Engine shut down", self.shared.name);
        Ok(())
    }
}

struct EngineLoop<D: Domain> {
    name: &'static str,
    store: Arc<Store<D>>,
    registrations: watch::Receiver<Registrations<D::Key>>,
    multiplexer: DemandMultiplexer<D::Key>,
    watchers: WatcherManager<D>,
    events: mpsc::UnboundedReceiver<WatcherMessage<D::Key, D::Value>>,
    state: watch::Sender<SharedState<D>>,
    shutdown: watch::Receiver<bool>,
}

impl<D: Domain> EngineLoop<D> {
    async fn run(mut self) {
        loop {
            let deadline = self.multiplexer.deadline();

            tokio::select! {
                biased;

                _ = self.shutdown.changed() => break,

                changed = self.registrations.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Let registrations made in the same turn land first
                    tokio::task::yield_now().await;
                    let keys: Vec<D::Key> = self
                        .registrations
                        .borrow_and_update()
                        .values()
                        .cloned()
                        .collect();
                    if let Some(demand) = self.multiplexer.offer(keys, Instant::now()) {
                        self.apply_demand(&demand);
                    }
                }

                Some(message) = self.events.recv() => {
                    self.watchers.handle(message, &self.store);
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(demand) = self.multiplexer.flush(Instant::now()) {
                        self.apply_demand(&demand);
                    }
                }
            }

            self.publish();
        }

        self.watchers.shutdown();
        debug!("[{}] Engine loop stopped", self.name);
    }

    fn apply_demand(&mut self, demand: &DemandSet<D::Key>) {
        debug!("[{}] Demand changed: {} keys", self.name, demand.len());
        self.watchers.reconcile(demand, &self.store);
    }

    fn publish(&self) {
        let next = combine(
            self.multiplexer.current(),
            &self.watchers.statuses(),
            self.store.get_all(),
        );
        self.state.send_if_modified(|current| {
            if **current == next {
                false
            } else {
                *current = Arc::new(next);
                true
            }
        });
    }
}

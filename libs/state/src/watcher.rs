//! Watcher lifecycle manager
//!
//! Owns one slot per demanded key. Each slot runs at most one watch task and
//! one timer, both tagged with the slot's current generation. Every restart,
//! failure or teardown retires the generation, so messages still in flight
//! from an older watch are discarded instead of written to the store.

use crate::demand::DemandSet;
use crate::error::WatchError;
use crate::source::{Domain, WatchRequest};
use crate::stats::EngineStats;
use crate::status::LoadingStatus;
use crate::store::Store;
use config::CacheSettings;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

pub(crate) enum WatcherEvent<V> {
    Value(V),
    Failed(WatchError),
    RetryDue,
    CacheExpired,
}

pub(crate) struct WatcherMessage<K, V> {
    pub(crate) key: K,
    pub(crate) generation: u64,
    pub(crate) event: WatcherEvent<V>,
}

type EventSender<D> = mpsc::UnboundedSender<WatcherMessage<<D as Domain>::Key, <D as Domain>::Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchKind {
    Push,
    Poll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Loading,
    Loaded,
    Backoff,
}

struct WatcherSlot {
    generation: u64,
    kind: WatchKind,
    phase: Phase,
    attempt: u32,
    task: Option<AbortHandle>,
    timer: Option<AbortHandle>,
}

impl WatcherSlot {
    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn status(&self) -> LoadingStatus {
        match self.phase {
            Phase::Loading => LoadingStatus::Loading,
            Phase::Loaded => LoadingStatus::Loaded,
            Phase::Backoff => LoadingStatus::Stale,
        }
    }
}

pub(crate) struct WatcherManager<D: Domain> {
    domain: Arc<D>,
    settings: CacheSettings,
    slots: HashMap<D::Key, WatcherSlot>,
    next_generation: u64,
    events: EventSender<D>,
    stats: Arc<EngineStats>,
}

impl<D: Domain> WatcherManager<D> {
    pub(crate) fn new(
        domain: Arc<D>,
        settings: CacheSettings,
        events: EventSender<D>,
        stats: Arc<EngineStats>,
    ) -> Self {
        Self {
            domain,
            settings,
            slots: HashMap::new(),
            next_generation: 0,
            events,
            stats,
        }
    }

    /// Open watchers for new demand and tear down the rest
    ///
    /// Keys whose stored value has content start first.
    pub(crate) fn reconcile(&mut self, demand: &DemandSet<D::Key>, store: &Store<D>) {
        let retired: Vec<D::Key> = self
            .slots
            .keys()
            .filter(|key| !demand.contains(key))
            .cloned()
            .collect();
        for key in retired {
            if let Some(mut slot) = self.slots.remove(&key) {
                slot.abort();
                self.stats.record_stop();
                debug!("[{}] Stopped watcher for {}", self.domain.name(), key);
            }
        }

        let mut missing: Vec<&D::Key> = demand
            .iter()
            .filter(|key| !self.slots.contains_key(*key))
            .collect();
        missing.sort_by_key(|key| !store.has_content(key));
        for key in missing {
            self.start(key.clone(), 0);
        }

        self.stats.set_active_watchers(self.slots.len());
    }

    /// Apply one watcher message; returns whether any state changed
    pub(crate) fn handle(
        &mut self,
        message: WatcherMessage<D::Key, D::Value>,
        store: &Store<D>,
    ) -> bool {
        let WatcherMessage {
            key,
            generation,
            event,
        } = message;

        let current = self.slots.get(&key).map(|slot| slot.generation);
        if current != Some(generation) {
            self.stats.record_discard();
            debug!(
                "[{}] Discarded delivery for {} from retired generation {}",
                self.domain.name(),
                key,
                generation
            );
            return false;
        }

        match event {
            WatcherEvent::Value(value) => {
                store.set(key.clone(), value);
                if let Some(slot) = self.slots.get_mut(&key) {
                    slot.phase = Phase::Loaded;
                    slot.attempt = 0;
                    if slot.kind == WatchKind::Poll {
                        slot.task = None;
                        slot.timer = Some(spawn_timer(
                            &self.events,
                            key,
                            generation,
                            self.settings.cache_duration(),
                            WatcherEvent::CacheExpired,
                        ));
                    }
                }
            }
            WatcherEvent::Failed(err) => {
                self.stats.record_failure();
                self.next_generation += 1;
                let retry_generation = self.next_generation;

                if let Some(slot) = self.slots.get_mut(&key) {
                    slot.abort();
                    let delay = self.settings.backoff(slot.attempt);
                    warn!(
                        "[{}] Watcher for {} failed (attempt {}): {}; retrying in {:?}",
                        self.domain.name(),
                        key,
                        slot.attempt + 1,
                        err,
                        delay
                    );

                    slot.generation = retry_generation;
                    slot.phase = Phase::Backoff;
                    slot.attempt = slot.attempt.saturating_add(1);
                    slot.timer = Some(spawn_timer(
                        &self.events,
                        key,
                        retry_generation,
                        delay,
                        WatcherEvent::RetryDue,
                    ));
                }
            }
            WatcherEvent::RetryDue => {
                let attempt = self.slots.get(&key).map(|slot| slot.attempt).unwrap_or(0);
                self.start(key, attempt);
            }
            WatcherEvent::CacheExpired => {
                debug!("[{}] Cached value for {} expired, refetching", self.domain.name(), key);
                self.start(key, 0);
            }
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn status(&self, key: &D::Key) -> LoadingStatus {
        self.slots
            .get(key)
            .map(WatcherSlot::status)
            .unwrap_or_default()
    }

    pub(crate) fn statuses(&self) -> HashMap<D::Key, LoadingStatus> {
        self.slots
            .iter()
            .map(|(key, slot)| (key.clone(), slot.status()))
            .collect()
    }

    pub(crate) fn shutdown(&mut self) {
        for slot in self.slots.values_mut() {
            slot.abort();
        }
        self.slots.clear();
        self.stats.set_active_watchers(0);
    }

    #[cfg(test)]
    pub(crate) fn generation(&self, key: &D::Key) -> Option<u64> {
        self.slots.get(key).map(|slot| slot.generation)
    }

    // Replaces any previous slot for the key under a fresh generation
    fn start(&mut self, key: D::Key, attempt: u32) {
        if let Some(mut previous) = self.slots.remove(&key) {
            previous.abort();
        }
        self.next_generation += 1;
        let generation = self.next_generation;

        let (kind, task) = match self.domain.watch(&key) {
            WatchRequest::Push(stream) => (
                WatchKind::Push,
                tokio::spawn(guard_panics(
                    key.clone(),
                    generation,
                    self.events.clone(),
                    run_push(key.clone(), generation, stream, self.events.clone()),
                )),
            ),
            WatchRequest::Poll(fetch) => (
                WatchKind::Poll,
                tokio::spawn(guard_panics(
                    key.clone(),
                    generation,
                    self.events.clone(),
                    run_poll(
                        key.clone(),
                        generation,
                        fetch,
                        self.settings.fetch_timeout(),
                        self.events.clone(),
                    ),
                )),
            ),
        };

        self.stats.record_start();
        debug!(
            "[{}] Started {:?} watcher for {} (generation {}, attempt {})",
            self.domain.name(),
            kind,
            key,
            generation,
            attempt
        );

        self.slots.insert(
            key,
            WatcherSlot {
                generation,
                kind,
                phase: Phase::Loading,
                attempt,
                task: Some(task.abort_handle()),
                timer: None,
            },
        );
    }
}

async fn run_push<K, V>(
    key: K,
    generation: u64,
    mut stream: BoxStream<'static, Result<V, WatchError>>,
    events: mpsc::UnboundedSender<WatcherMessage<K, V>>,
) where
    K: Clone,
{
    while let Some(item) = stream.next().await {
        let (event, terminal) = match item {
            Ok(value) => (WatcherEvent::Value(value), false),
            Err(err) => (WatcherEvent::Failed(err), true),
        };
        let message = WatcherMessage {
            key: key.clone(),
            generation,
            event,
        };
        if events.send(message).is_err() || terminal {
            return;
        }
    }

    let _ = events.send(WatcherMessage {
        key,
        generation,
        event: WatcherEvent::Failed(WatchError::StreamClosed),
    });
}

async fn run_poll<K, V>(
    key: K,
    generation: u64,
    fetch: BoxFuture<'static, Result<V, WatchError>>,
    timeout: Duration,
    events: mpsc::UnboundedSender<WatcherMessage<K, V>>,
) {
    let event = match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(value)) => WatcherEvent::Value(value),
        Ok(Err(err)) => WatcherEvent::Failed(err),
        Err(_) => WatcherEvent::Failed(WatchError::Timeout(timeout)),
    };
    let _ = events.send(WatcherMessage {
        key,
        generation,
        event,
    });
}

// A panicking watch fails its generation like any other error
async fn guard_panics<K, V>(
    key: K,
    generation: u64,
    events: mpsc::UnboundedSender<WatcherMessage<K, V>>,
    watch: impl Future<Output = ()>,
) {
    if AssertUnwindSafe(watch).catch_unwind().await.is_err() {
        let _ = events.send(WatcherMessage {
            key,
            generation,
            event: WatcherEvent::Failed(WatchError::Panicked),
        });
    }
}

fn spawn_timer<K, V>(
    events: &mpsc::UnboundedSender<WatcherMessage<K, V>>,
    key: K,
    generation: u64,
    delay: Duration,
    event: WatcherEvent<V>,
) -> AbortHandle
where
    K: Send + 'static,
    V: Send + 'static,
{
    let events = events.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = events.send(WatcherMessage {
            key,
            generation,
            event,
        });
    })
    .abort_handle()
}

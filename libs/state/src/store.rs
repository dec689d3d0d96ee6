//! In-memory key-value store with debounced snapshot persistence
//!
//! Values live in a `DashMap` shared by the engine loop (single writer per
//! key), readers and the background snapshot writer. Every `set` marks the
//! store dirty; the writer waits one debounce window from the first dirty mark
//! and then writes the whole store as one JSON snapshot.

use crate::error::{DecodeError, PersistenceError};
use crate::key::CacheKey;
use crate::source::Domain;
use crate::stats::EngineStats;
use crate::storage::SnapshotStorage;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Persisted, overlay-aware value store of one engine
pub struct Store<D: Domain> {
    domain: Arc<D>,
    namespace: String,
    entries: DashMap<D::Key, D::Value>,
    storage: Arc<dyn SnapshotStorage>,
    dirty_tx: mpsc::UnboundedSender<()>,
    stats: Arc<EngineStats>,
    // Serializes snapshot writes from the writer task and explicit flushes
    flush_lock: Mutex<()>,
}

impl<D: Domain> Store<D> {
    /// Load the namespaced snapshot and start the background writer
    ///
    /// Must be called from within a Tokio runtime. A snapshot that fails to
    /// read or decode is discarded as a whole and the store starts empty.
    pub fn open(
        domain: Arc<D>,
        storage: Arc<dyn SnapshotStorage>,
        namespace: impl Into<String>,
        persist_debounce: Duration,
        stats: Arc<EngineStats>,
    ) -> Arc<Self> {
        let namespace = namespace.into();
        let entries = DashMap::new();

        match storage.read(&namespace) {
            Ok(Some(bytes)) => match decode_snapshot::<D::Key, D::Value>(&bytes) {
                Ok(pairs) => {
                    info!("Loaded {} entries from snapshot {}", pairs.len(), namespace);
                    for (key, value) in pairs {
                        entries.insert(key, value);
                    }
                }
                Err(err) => {
                    warn!("Discarding malformed snapshot {}: {}", namespace, err);
                }
            },
            Ok(None) => {
                debug!("No existing snapshot for {}", namespace);
            }
            Err(err) => {
                warn!("Failed to read snapshot {}: {}", namespace, err);
            }
        }

        let (dirty_tx, dirty_rx) = mpsc::unbounded_channel();
        let store = Arc::new(Self {
            domain,
            namespace,
            entries,
            storage,
            dirty_tx,
            stats,
            flush_lock: Mutex::new(()),
        });
        store.apply_overlay_all();

        tokio::spawn(Self::writer_loop(
            Arc::downgrade(&store),
            dirty_rx,
            persist_debounce,
        ));
        store
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get(&self, key: &D::Key) -> Option<D::Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store a value after passing it through the domain overlay
    ///
    /// Returns whether the stored value changed. Changes schedule a snapshot
    /// write.
    pub fn set(&self, key: D::Key, value: D::Value) -> bool {
        let changed = match self.domain.apply_overlay(&key, Some(value)) {
            Some(value) => match self.entries.insert(key, value.clone()) {
                Some(previous) => previous != value,
                None => true,
            },
            None => self.entries.remove(&key).is_some(),
        };

        if changed {
            let _ = self.dirty_tx.send(());
        }
        changed
    }

    /// All entries, ordered by key
    pub fn get_all(&self) -> Vec<(D::Key, D::Value)> {
        let mut all: Vec<(D::Key, D::Value)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Whether the stored value is worth starting a watcher for first
    pub fn has_content(&self, key: &D::Key) -> bool {
        self.entries
            .get(key)
            .map(|entry| self.domain.has_content(entry.value()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the snapshot now
    ///
    /// Blocks on storage I/O; concurrent callers write one at a time.
    pub fn flush(&self) -> Result<(), PersistenceError> {
        let _guard = self.flush_lock.lock();
        let pairs: Vec<(String, D::Value)> = self
            .get_all()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        let bytes = serde_json::to_vec(&pairs)?;
        self.storage.write(&self.namespace, &bytes)?;
        self.stats.record_snapshot_write();

        debug!("Persisted {} entries to {}", pairs.len(), self.namespace);
        Ok(())
    }

    fn apply_overlay_all(&self) {
        let mut keys: BTreeSet<D::Key> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.extend(self.domain.overlay_keys());

        for key in keys {
            let current = self.get(&key);
            match self.domain.apply_overlay(&key, current) {
                Some(value) => {
                    self.entries.insert(key, value);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    async fn writer_loop(
        store: Weak<Self>,
        mut dirty_rx: mpsc::UnboundedReceiver<()>,
        debounce: Duration,
    ) {
        while dirty_rx.recv().await.is_some() {
            tokio::time::sleep(debounce).await;
            while dirty_rx.try_recv().is_ok() {}

            let Some(store) = store.upgrade() else {
                break;
            };
            let flushed = tokio::task::spawn_blocking(move || {
                let result = store.flush();
                (store, result)
            })
            .await;
            match flushed {
                Ok((_, Ok(()))) => {}
                Ok((store, Err(err))) => {
                    error!("Failed to persist snapshot {}: {}", store.namespace, err);
                }
                Err(err) => {
                    error!("Snapshot writer task failed: {}", err);
                }
            }
        }
        debug!("Snapshot writer stopped");
    }
}

/// Decode a `[[key, value], ...]` snapshot, failing on the first bad pair
pub fn decode_snapshot<K, V>(bytes: &[u8]) -> Result<Vec<(K, V)>, DecodeError>
where
    K: CacheKey,
    V: DeserializeOwned,
{
    let pairs: Vec<(String, V)> = serde_json::from_slice(bytes)?;
    pairs
        .into_iter()
        .map(|(key, value)| Ok((K::parse_key(&key)?, value)))
        .collect()
}

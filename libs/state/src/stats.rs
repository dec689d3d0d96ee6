//! Engine counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by the engine loop and the snapshot writer
#[derive(Debug, Default)]
pub struct EngineStats {
    watcher_starts: AtomicU64,
    watcher_stops: AtomicU64,
    discarded_deliveries: AtomicU64,
    failures: AtomicU64,
    snapshot_writes: AtomicU64,
    active_watchers: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStatsSnapshot {
    /// Watches opened, including retries and poll refreshes
    pub watcher_starts: u64,
    /// Watchers torn down because their key left demand
    pub watcher_stops: u64,
    /// Messages dropped because their generation was retired
    pub discarded_deliveries: u64,
    pub failures: u64,
    pub snapshot_writes: u64,
    pub active_watchers: u64,
}

impl EngineStats {
    pub(crate) fn record_start(&self) {
        self.watcher_starts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stop(&self) {
        self.watcher_stops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discard(&self) {
        self.discarded_deliveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_snapshot_write(&self) {
        self.snapshot_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_active_watchers(&self, count: usize) {
        self.active_watchers.store(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            watcher_starts: self.watcher_starts.load(Ordering::Relaxed),
            watcher_stops: self.watcher_stops.load(Ordering::Relaxed),
            discarded_deliveries: self.discarded_deliveries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            snapshot_writes: self.snapshot_writes.load(Ordering::Relaxed),
            active_watchers: self.active_watchers.load(Ordering::Relaxed),
        }
    }
}

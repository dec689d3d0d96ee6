//! Per-key loading lifecycle

use serde::{Deserialize, Serialize};

/// Loading state of one key
///
/// `Stale`: not watched, or the last watch failed and a retry is pending.
/// `Loading`: a watcher is active and has not delivered yet.
/// `Loaded`: the active watcher delivered at least one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingStatus {
    #[default]
    Stale,
    Loading,
    Loaded,
}

impl LoadingStatus {
    pub fn is_loaded(self) -> bool {
        self == LoadingStatus::Loaded
    }
}

/// A key with its cached value and loading status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedEntry<K, V> {
    pub key: K,
    pub value: Option<V>,
    pub status: LoadingStatus,
}

impl<K, V> CachedEntry<K, V> {
    /// Entry for a key nothing is known about
    pub fn stale(key: K) -> Self {
        Self {
            key,
            value: None,
            status: LoadingStatus::Stale,
        }
    }
}

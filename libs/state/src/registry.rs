//! Subscription registry
//!
//! Tracks which keys are wanted by at least one live consumer. Registrations
//! are independent: the same key registered twice stays demanded until both
//! tokens are unregistered.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Opaque handle of one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionToken(u64);

/// Live registrations, published on every change
pub type Registrations<K> = Arc<BTreeMap<SubscriptionToken, K>>;

struct RegistryInner<K> {
    next_token: u64,
    entries: BTreeMap<SubscriptionToken, K>,
}

pub struct SubscriptionRegistry<K> {
    inner: Mutex<RegistryInner<K>>,
    changes: watch::Sender<Registrations<K>>,
}

impl<K: Clone + Send + Sync> SubscriptionRegistry<K> {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(Arc::new(BTreeMap::new()));
        Self {
            inner: Mutex::new(RegistryInner {
                next_token: 0,
                entries: BTreeMap::new(),
            }),
            changes,
        }
    }

    /// Receiver of the `token → key` map; marks the current map as seen
    pub fn changes(&self) -> watch::Receiver<Registrations<K>> {
        self.changes.subscribe()
    }

    pub fn register(&self, key: K) -> SubscriptionToken {
        let mut inner = self.inner.lock();
        let token = SubscriptionToken(inner.next_token);
        inner.next_token += 1;
        inner.entries.insert(token, key);
        self.publish(&inner);
        token
    }

    /// Remove a registration; unknown tokens are a no-op returning `false`
    pub fn unregister(&self, token: SubscriptionToken) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.entries.remove(&token).is_some();
        if removed {
            self.publish(&inner);
        }
        removed
    }

    /// Drop every registration
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        if !inner.entries.is_empty() {
            inner.entries.clear();
            self.publish(&inner);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of all live registrations, with repeats
    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().entries.values().cloned().collect()
    }

    // Called with the lock held so publications follow mutation order
    fn publish(&self, inner: &RegistryInner<K>) {
        self.changes.send_replace(Arc::new(inner.entries.clone()));
    }
}

impl<K: Clone + Send + Sync> Default for SubscriptionRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

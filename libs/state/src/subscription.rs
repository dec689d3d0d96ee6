//! Consumer-side view of a set of keys

use crate::combiner::CombinedState;
use crate::key::CacheKey;
use crate::registry::{SubscriptionRegistry, SubscriptionToken};
use crate::status::{CachedEntry, LoadingStatus};
use futures::Stream;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Entries for the subscribed keys, in subscription order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionState<K, V> {
    pub data: Vec<CachedEntry<K, V>>,
    /// `true` while any entry is not `Loaded`
    pub is_loading: bool,
}

impl<K: PartialEq, V> SubscriptionState<K, V> {
    pub fn from_entries(data: Vec<CachedEntry<K, V>>) -> Self {
        let is_loading = data.iter().any(|entry| entry.status != LoadingStatus::Loaded);
        Self { data, is_loading }
    }

    pub fn get(&self, key: &K) -> Option<&CachedEntry<K, V>> {
        self.data.iter().find(|entry| &entry.key == key)
    }

    pub fn value(&self, key: &K) -> Option<&V> {
        self.get(key).and_then(|entry| entry.value.as_ref())
    }
}

/// Live registration of keys with an engine
///
/// Dropping the subscription unregisters its keys; the engine stops their
/// watchers once no other subscription wants them.
pub struct Subscription<K: CacheKey, V: Clone + PartialEq> {
    keys: Vec<K>,
    tokens: Vec<SubscriptionToken>,
    registry: Arc<SubscriptionRegistry<K>>,
    state: watch::Receiver<Arc<CombinedState<K, V>>>,
    last: Option<SubscriptionState<K, V>>,
}

impl<K: CacheKey, V: Clone + PartialEq> Subscription<K, V> {
    pub fn new(
        keys: Vec<K>,
        registry: Arc<SubscriptionRegistry<K>>,
        state: watch::Receiver<Arc<CombinedState<K, V>>>,
    ) -> Self {
        let tokens = keys.iter().map(|key| registry.register(key.clone())).collect();
        Self {
            keys,
            tokens,
            registry,
            state,
            last: None,
        }
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// View of the latest published engine state
    pub fn current(&self) -> SubscriptionState<K, V> {
        SubscriptionState::from_entries(self.state.borrow().view(&self.keys))
    }

    /// Next distinct view; the first call returns the current view at once
    ///
    /// Returns `None` once the engine has stopped.
    pub async fn next(&mut self) -> Option<SubscriptionState<K, V>> {
        loop {
            let view = {
                let state = self.state.borrow_and_update();
                SubscriptionState::from_entries(state.view(&self.keys))
            };
            if self.last.as_ref() != Some(&view) {
                self.last = Some(view.clone());
                return Some(view);
            }
            if self.state.changed().await.is_err() {
                return None;
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = SubscriptionState<K, V>> + Send
    where
        V: Send + Sync + 'static,
    {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription.next().await.map(|view| (view, subscription))
        })
    }
}

impl<K: CacheKey, V: Clone + PartialEq> Drop for Subscription<K, V> {
    fn drop(&mut self) {
        for token in self.tokens.drain(..) {
            self.registry.unregister(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combiner::combine;
    use crate::demand::DemandSet;
    use futures::StreamExt;
    use std::collections::HashMap;
    use tokio_test::{assert_pending, assert_ready};

    type State = Arc<CombinedState<String, u64>>;

    fn loaded(key: &str, value: u64) -> State {
        let demand = DemandSet::from_keys(vec![key.to_string()]);
        let statuses = HashMap::from([(key.to_string(), LoadingStatus::Loaded)]);
        Arc::new(combine(&demand, &statuses, vec![(key.to_string(), value)]))
    }

    #[tokio::test]
    async fn test_next_yields_initial_then_changes() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let (tx, rx) = watch::channel::<State>(Arc::new(CombinedState::default()));
        let mut subscription = Subscription::new(vec!["a".to_string()], registry.clone(), rx);
        assert_eq!(registry.len(), 1);

        let initial = subscription.next().await.unwrap();
        assert!(initial.is_loading);
        assert_eq!(initial.data, vec![CachedEntry::stale("a".to_string())]);

        {
            let mut next = tokio_test::task::spawn(subscription.next());
            assert_pending!(next.poll());

            tx.send_replace(loaded("a", 7));
            assert!(next.is_woken());
            let view = assert_ready!(next.poll()).unwrap();
            assert!(!view.is_loading);
            assert_eq!(view.value(&"a".to_string()), Some(&7));
        }

        // Same view published again is suppressed
        tx.send_replace(loaded("a", 7));
        let mut next = tokio_test::task::spawn(subscription.next());
        assert_pending!(next.poll());
    }

    #[tokio::test]
    async fn test_unrelated_changes_are_suppressed() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let (tx, rx) = watch::channel::<State>(loaded("a", 1));
        let mut subscription = Subscription::new(vec!["a".to_string()], registry, rx);
        subscription.next().await.unwrap();

        let demand = DemandSet::from_keys(vec!["a".to_string(), "b".to_string()]);
        let statuses = HashMap::from([("a".to_string(), LoadingStatus::Loaded)]);
        tx.send_replace(Arc::new(combine(&demand, &statuses, vec![("a".to_string(), 1)])));

        let mut next = tokio_test::task::spawn(subscription.next());
        assert_pending!(next.poll());
    }

    #[tokio::test]
    async fn test_drop_unregisters_and_stream_ends_with_engine() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let (tx, rx) = watch::channel::<State>(loaded("a", 1));
        let subscription = Subscription::new(
            vec!["a".to_string(), "a".to_string()],
            registry.clone(),
            rx,
        );
        assert_eq!(registry.len(), 2);

        let mut stream = Box::pin(subscription.into_stream());
        assert_eq!(stream.next().await.unwrap().data.len(), 2);

        drop(tx);
        assert!(stream.next().await.is_none());
        drop(stream);
        assert!(registry.is_empty());
    }
}

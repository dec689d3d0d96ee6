//! Chain watch capability and the domain binding consumed by the engine

use crate::error::WatchError;
use crate::key::CacheKey;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Block a push watch follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// Latest imported block; may be reorganised away
    #[default]
    Best,
    Finalized,
}

/// Remote read capability for one kind of chain value
#[async_trait]
pub trait ChainWatch<A, V>: Send + Sync
where
    A: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Point read at the best block
    async fn get_value(&self, args: &A) -> Result<V, WatchError>;

    /// Stream of values, one per change at `at`
    fn watch_value(&self, args: &A, at: BlockTag) -> BoxStream<'static, Result<V, WatchError>>;
}

/// How a domain observes one key
pub enum WatchRequest<V> {
    /// Long-lived subscription; every item is a new value. The stream ending
    /// counts as a failure.
    Push(BoxStream<'static, Result<V, WatchError>>),
    /// One-shot fetch, repeated after the cache duration
    Poll(BoxFuture<'static, Result<V, WatchError>>),
}

/// Binding of the generic engine to one kind of chain state
pub trait Domain: Send + Sync + 'static {
    type Key: CacheKey;
    type Value: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Snapshot namespace suffix, e.g. `balances` or `pools::v3`
    fn namespace(&self) -> &str;

    fn watch(&self, key: &Self::Key) -> WatchRequest<Self::Value>;

    /// Whether a cached value is worth showing first; content keys start
    /// their watchers before empty ones
    fn has_content(&self, _value: &Self::Value) -> bool {
        true
    }

    /// Patch a stored or fetched value with locally known data
    ///
    /// Called with `None` for keys that have no stored value. Returning `None`
    /// leaves the key absent.
    fn apply_overlay(&self, _key: &Self::Key, value: Option<Self::Value>) -> Option<Self::Value> {
        value
    }

    /// Keys the overlay can produce without any stored value
    fn overlay_keys(&self) -> Vec<Self::Key> {
        Vec::new()
    }
}

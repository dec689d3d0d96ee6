//! Asset Hub read capability and its adapter to the engine's chain watch seam

use crate::balances::BalanceKey;
use crate::pool_supplies::PoolSupplyKey;
use async_trait::async_trait;
use chain_state::{BlockTag, ChainWatch, WatchError, WatchRequest};
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use types::{ChainId, Planck, Pool, TokenId, TokenInfo};

/// Shared handle to one kind of chain read
pub type Source<K, V> = Arc<dyn ChainWatch<K, V>>;

/// Everything the engines need from an Asset Hub node
///
/// Implemented by the embedding application on top of its RPC client. Streams
/// yield one item per change and end only when the underlying subscription
/// is gone.
#[async_trait]
pub trait AssetHubApi: Send + Sync + 'static {
    /// Transferable balance of `key.address` in `key.token`
    fn watch_balance(
        &self,
        key: &BalanceKey,
        at: BlockTag,
    ) -> BoxStream<'static, Result<Planck, WatchError>>;

    async fn balance(&self, key: &BalanceKey) -> Result<Planck, WatchError>;

    /// Every asset-conversion pool on `chain`
    async fn pools(&self, chain: &ChainId) -> Result<Vec<Pool>, WatchError>;

    /// Total issuance of the LP token of the pool trading `key`'s pair
    fn watch_pool_supply(
        &self,
        key: &PoolSupplyKey,
        at: BlockTag,
    ) -> BoxStream<'static, Result<Planck, WatchError>>;

    async fn pool_supply(&self, key: &PoolSupplyKey) -> Result<Planck, WatchError>;

    /// `None` when the chain knows no such token
    async fn token_metadata(&self, token: &TokenId) -> Result<Option<TokenInfo>, WatchError>;
}

/// Exposes an [`AssetHubApi`] as one [`ChainWatch`] per domain
pub struct AssetHubWatch<T: ?Sized> {
    api: Arc<T>,
}

impl<T: AssetHubApi + ?Sized> AssetHubWatch<T> {
    pub fn new(api: Arc<T>) -> Self {
        Self { api }
    }
}

impl<T: ?Sized> Clone for AssetHubWatch<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

#[async_trait]
impl<T: AssetHubApi + ?Sized> ChainWatch<BalanceKey, Planck> for AssetHubWatch<T> {
    async fn get_value(&self, key: &BalanceKey) -> Result<Planck, WatchError> {
        self.api.balance(key).await
    }

    fn watch_value(
        &self,
        key: &BalanceKey,
        at: BlockTag,
    ) -> BoxStream<'static, Result<Planck, WatchError>> {
        self.api.watch_balance(key, at)
    }
}

#[async_trait]
impl<T: AssetHubApi + ?Sized> ChainWatch<PoolSupplyKey, Planck> for AssetHubWatch<T> {
    async fn get_value(&self, key: &PoolSupplyKey) -> Result<Planck, WatchError> {
        self.api.pool_supply(key).await
    }

    fn watch_value(
        &self,
        key: &PoolSupplyKey,
        at: BlockTag,
    ) -> BoxStream<'static, Result<Planck, WatchError>> {
        self.api.watch_pool_supply(key, at)
    }
}

#[async_trait]
impl<T: AssetHubApi + ?Sized> ChainWatch<ChainId, Vec<Pool>> for AssetHubWatch<T> {
    async fn get_value(&self, chain: &ChainId) -> Result<Vec<Pool>, WatchError> {
        self.api.pools(chain).await
    }

    /// Pool lists have no storage subscription; yields one fetch and stays open
    fn watch_value(
        &self,
        chain: &ChainId,
        _at: BlockTag,
    ) -> BoxStream<'static, Result<Vec<Pool>, WatchError>> {
        let api = self.api.clone();
        let chain = chain.clone();
        stream::once(async move { api.pools(&chain).await })
            .chain(stream::pending())
            .boxed()
    }
}

#[async_trait]
impl<T: AssetHubApi + ?Sized> ChainWatch<TokenId, Option<TokenInfo>> for AssetHubWatch<T> {
    async fn get_value(&self, token: &TokenId) -> Result<Option<TokenInfo>, WatchError> {
        self.api.token_metadata(token).await
    }

    /// Metadata has no storage subscription; yields one fetch and stays open
    fn watch_value(
        &self,
        token: &TokenId,
        _at: BlockTag,
    ) -> BoxStream<'static, Result<Option<TokenInfo>, WatchError>> {
        let api = self.api.clone();
        let token = token.clone();
        stream::once(async move { api.token_metadata(&token).await })
            .chain(stream::pending())
            .boxed()
    }
}

/// Push watch of `key` at the best block
pub(crate) fn push<K, V>(source: &Source<K, V>, key: &K) -> WatchRequest<V>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
{
    WatchRequest::Push(source.watch_value(key, BlockTag::Best))
}

/// One-shot fetch of `key`, owning everything it borrows
pub(crate) fn poll<K, V>(source: &Source<K, V>, key: &K) -> WatchRequest<V>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    let source = source.clone();
    let key = key.clone();
    WatchRequest::Poll(async move { source.get_value(&key).await }.boxed())
}

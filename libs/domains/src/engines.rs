//! Construction and shutdown of the four engines

use crate::api::{AssetHubApi, AssetHubWatch};
use crate::balances::{BalanceKey, BalancesDomain};
use crate::pool_supplies::{PoolSuppliesDomain, PoolSupplyKey};
use crate::pools::{reserve_keys, PoolsDomain};
use crate::tokens::TokensDomain;
use chain_state::{CacheEngine, FileStorage, SnapshotStorage, StateError, Subscription};
use config::AppConfig;
use std::sync::Arc;
use tracing::{error, info};
use types::{Planck, Pool};

/// The balance, pool, pool supply and token engines of one application
///
/// Built once at startup and handed to consumers; tests build their own.
#[derive(Clone)]
pub struct ChainStateEngines {
    pub balances: CacheEngine<BalancesDomain>,
    pub pools: CacheEngine<PoolsDomain>,
    pub pool_supplies: CacheEngine<PoolSuppliesDomain>,
    pub tokens: CacheEngine<TokensDomain>,
}

impl ChainStateEngines {
    /// Spawn every engine against `api`, persisting into `storage`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<T: AssetHubApi>(
        api: Arc<T>,
        config: &AppConfig,
        storage: Arc<dyn SnapshotStorage>,
    ) -> Self {
        let watch = AssetHubWatch::new(api);
        let namespace = config.app.namespace.as_str();

        let balances = CacheEngine::spawn(
            BalancesDomain::new(Arc::new(watch.clone()))
                .with_overrides(&config.balance_overrides),
            &config.balances,
            storage.clone(),
            namespace,
        );
        let pools = CacheEngine::spawn(
            PoolsDomain::new(Arc::new(watch.clone())),
            &config.pools,
            storage.clone(),
            namespace,
        );
        let pool_supplies = CacheEngine::spawn(
            PoolSuppliesDomain::new(Arc::new(watch.clone())),
            &config.pool_supplies,
            storage.clone(),
            namespace,
        );
        let tokens = CacheEngine::spawn(
            TokensDomain::new(Arc::new(watch)).with_overrides(&config.token_overrides),
            &config.tokens,
            storage,
            namespace,
        );

        info!("Chain state engines started under namespace {}", namespace);
        Self {
            balances,
            pools,
            pool_supplies,
            tokens,
        }
    }

    /// Spawn with one snapshot file per engine under `config.app.storage_dir`
    pub fn with_file_storage<T: AssetHubApi>(api: Arc<T>, config: &AppConfig) -> Self {
        let storage = Arc::new(FileStorage::new(config.app.storage_dir.clone()));
        Self::spawn(api, config, storage)
    }

    /// Watch both reserves of `pool`
    pub fn subscribe_reserves(&self, pool: &Pool) -> Subscription<BalanceKey, Planck> {
        self.balances.subscribe(reserve_keys(pool))
    }

    /// Watch the LP supply of `pool`
    pub fn subscribe_pool_supply(&self, pool: &Pool) -> Subscription<PoolSupplyKey, Planck> {
        self.pool_supplies.subscribe([PoolSupplyKey::for_pool(pool)])
    }

    /// Stop all engines and flush their snapshots
    ///
    /// Every engine is shut down even when an earlier one fails; the first
    /// failure is returned.
    pub async fn shutdown(&self) -> Result<(), StateError> {
        let results = [
            self.balances.shutdown().await,
            self.pools.shutdown().await,
            self.pool_supplies.shutdown().await,
            self.tokens.shutdown().await,
        ];

        let mut first_error = None;
        for result in results {
            if let Err(err) = result {
                error!("Engine shutdown failed: {}", err);
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

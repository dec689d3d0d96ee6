//! # Domains - Asset Hub Bindings
//!
//! Instantiates the generic [`chain_state::CacheEngine`] four times:
//!
//! | Domain | Key | Value | Watch |
//! |--------|-----|-------|-------|
//! | [`BalancesDomain`] | [`BalanceKey`] | [`Planck`](types::Planck) | push, best block |
//! | [`PoolsDomain`] | [`ChainId`](types::ChainId) | `Vec<Pool>` | poll |
//! | [`PoolSuppliesDomain`] | [`PoolSupplyKey`] | [`Planck`](types::Planck) | push, best block |
//! | [`TokensDomain`] | [`TokenId`](types::TokenId) | `Option<TokenInfo>` | poll |
//!
//! The chain itself stays behind [`AssetHubApi`], implemented by the embedding
//! application. [`ChainStateEngines`] builds all four engines from an
//! [`AppConfig`](config::AppConfig).
//!
//! Pool reserves are not a domain of their own: they are the pool owner's
//! balances, read from the balance engine by [`pool_reserves`] and fed into
//! the AMM math by [`quote_swap`].

pub mod api;
pub mod balances;
pub mod engines;
pub mod error;
pub mod known_tokens;
pub mod pool_supplies;
pub mod pools;
pub mod reserves;
pub mod tokens;

pub use api::{AssetHubApi, AssetHubWatch};
pub use balances::{BalanceKey, BalancesDomain};
pub use engines::ChainStateEngines;
pub use error::DomainError;
pub use pool_supplies::{PoolSuppliesDomain, PoolSupplyKey};
pub use pools::{find_pool, reserve_keys, PoolsDomain};
pub use reserves::{pool_reserves, quote_swap};
pub use tokens::{TokenOverride, TokensDomain};

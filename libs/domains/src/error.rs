//! Domain-level errors

use amm::AmmError;
use thiserror::Error;
use types::{TokenId, TypeError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Composite cache key does not follow `<left>||<right>`
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Invalid planck amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("Token {token} is not traded by pool {pool_asset_id}")]
    TokenNotInPool { token: TokenId, pool_asset_id: u32 },

    /// Owner balance of a pooled token has not been loaded yet
    #[error("Reserve not loaded: {0}")]
    ReserveNotLoaded(String),

    #[error(transparent)]
    Amm(#[from] AmmError),
}

impl DomainError {
    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

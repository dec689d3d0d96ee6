//! Validation errors for identifiers and amounts

use thiserror::Error;

/// Errors raised while parsing or converting shared types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Chain identifier is empty or contains characters outside `[a-z0-9_-]`
    #[error("Invalid chain id: '{0}'")]
    InvalidChainId(String),

    /// Address is not a base58 account address
    #[error("Invalid address: '{0}'")]
    InvalidAddress(String),

    /// Token identifier does not follow `<kind>::<chain>[::<id>]`
    #[error("Invalid token id: '{input}' - {reason}")]
    InvalidTokenId { input: String, reason: String },

    /// Amount does not fit the target representation
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    /// Token decimals beyond what a decimal amount can carry
    #[error("Unsupported decimals: {0} (max 28)")]
    UnsupportedDecimals(u8),
}

impl TypeError {
    pub(crate) fn token_id(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTokenId {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

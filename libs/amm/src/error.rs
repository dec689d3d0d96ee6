use thiserror::Error;

/// Deterministic failures of the AMM formulas; never worth retrying
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AmmError {
    /// One of the reserves (or the LP supply) is zero
    #[error("No liquidity in pool")]
    NoLiquidity,

    /// Requested output or withdrawal exceeds what the pool holds
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u128, available: u128 },

    /// Zero amount where a positive one is required
    #[error("Amount must be positive")]
    ZeroAmount,

    /// Deposit too small to mint any LP token
    #[error("Deposit too small to mint liquidity")]
    InsufficientLiquidityMinted,

    /// LP fee outside `0..1000` parts per thousand
    #[error("Invalid LP fee: {0} per mille")]
    InvalidFee(u16),

    /// Result does not fit in a `u128`
    #[error("Arithmetic overflow")]
    Overflow,
}

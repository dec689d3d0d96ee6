//! # Tidewatch AMM Library - Constant Product Math
//!
//! ## Purpose
//!
//! Integer-only constant-product formulas used to size swaps, estimate price
//! impact and slippage, and size liquidity deposits and withdrawals. Every
//! function reproduces the asset-conversion pallet's arithmetic exactly,
//! including floor division, so fee and slippage estimates agree with what the
//! chain will execute.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool reserves (owner balances) and LP supplies from the
//!   chain-state caches, user-entered amounts converted to plancks
//! - **Output Destinations**: Swap and liquidity forms, max-amount buttons,
//!   minimum-received guards passed to extrinsics
//! - **Precision**: `u128` inputs and outputs, 512-bit intermediates; floats only
//!   appear as the final step of ratio outputs
//!
//! ## Architecture Role
//!
//! ```text
//! Balance cache ─┐
//!                ├─→ [PoolReserves] ─→ ConstantProduct::amm_output ─→ SwapQuote
//! Pool cache ────┘                   └→ ConstantProduct::price_impact
//! Supply cache ─────→ LiquidityMath::{lp_tokens_for_deposit, withdrawal_amounts}
//! Caller fees ──────→ sizing::{split_app_commission, max_swap_amount}
//! ```
//!
//! The library has no I/O and no dependency on the caches; callers pass plain
//! integers.

pub mod constant_product;
pub mod error;
pub mod liquidity;
pub mod pool_traits;
pub mod sizing;

mod wide;

pub use constant_product::{ConstantProduct, SwapOutput};
pub use error::AmmError;
pub use liquidity::{LiquidityMath, MINT_MIN_LIQUIDITY};
pub use pool_traits::{AmmPool, PoolReserves, SwapQuote};
pub use sizing::{max_swap_amount, split_app_commission, AppCommission};

/// LP fee charged by asset-conversion pools, in parts per thousand
pub const DEFAULT_LP_FEE_PER_MILLE: u16 = 3;

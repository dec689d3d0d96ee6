//! Liquidity sizing for asset-conversion pools

use crate::wide::{narrow, narrow_saturating, wide};
use crate::AmmError;

/// LP tokens locked forever on the first deposit into a pool
pub const MINT_MIN_LIQUIDITY: u128 = 100;

const SHARE_SCALE: u128 = 1_000_000;

/// Deposit and withdrawal math mirroring the on-chain pallet
pub struct LiquidityMath;

impl LiquidityMath {
    /// Amount of token B matching `amount_a` of token A at the current ratio
    pub fn quote_liquidity(amount_a: u128, reserve_a: u128, reserve_b: u128) -> Result<u128, AmmError> {
        if amount_a == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_a == 0 || reserve_b == 0 {
            return Err(AmmError::NoLiquidity);
        }
        narrow(wide(amount_a) * wide(reserve_b) / wide(reserve_a))
    }

    /// LP tokens minted for depositing `amount1` and `amount2`
    ///
    /// An empty pool (`total_supply == 0`) mints `isqrt(amount1 * amount2)`
    /// minus [`MINT_MIN_LIQUIDITY`]; otherwise the smaller of the two
    /// proportional shares is minted.
    pub fn lp_tokens_for_deposit(
        amount1: u128,
        amount2: u128,
        reserve1: u128,
        reserve2: u128,
        total_supply: u128,
    ) -> Result<u128, AmmError> {
        if amount1 == 0 || amount2 == 0 {
            return Err(AmmError::ZeroAmount);
        }

        let minted = if total_supply == 0 {
            let root = narrow((wide(amount1) * wide(amount2)).integer_sqrt())?;
            if root <= MINT_MIN_LIQUIDITY {
                return Err(AmmError::InsufficientLiquidityMinted);
            }
            root - MINT_MIN_LIQUIDITY
        } else {
            if reserve1 == 0 || reserve2 == 0 {
                return Err(AmmError::NoLiquidity);
            }
            let supply = wide(total_supply);
            let side1 = wide(amount1) * supply / wide(reserve1);
            let side2 = wide(amount2) * supply / wide(reserve2);
            narrow(side1.min(side2))?
        };

        if minted == 0 {
            return Err(AmmError::InsufficientLiquidityMinted);
        }
        Ok(minted)
    }

    /// Token amounts returned for burning `lp_amount`
    pub fn withdrawal_amounts(
        lp_amount: u128,
        reserve1: u128,
        reserve2: u128,
        total_supply: u128,
    ) -> Result<(u128, u128), AmmError> {
        if total_supply == 0 {
            return Err(AmmError::NoLiquidity);
        }
        if lp_amount > total_supply {
            return Err(AmmError::InsufficientLiquidity {
                requested: lp_amount,
                available: total_supply,
            });
        }
        let lp = wide(lp_amount);
        let supply = wide(total_supply);
        Ok((
            narrow(lp * wide(reserve1) / supply)?,
            narrow(lp * wide(reserve2) / supply)?,
        ))
    }

    /// Fraction of the pool owned by `lp_balance`, at 1e-6 resolution
    pub fn pool_share(lp_balance: u128, total_supply: u128) -> f64 {
        if total_supply == 0 {
            return 0.0;
        }
        let scaled = narrow_saturating(wide(lp_balance) * wide(SHARE_SCALE) / wide(total_supply));
        scaled as f64 / SHARE_SCALE as f64
    }
}

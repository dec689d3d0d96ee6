//! Pool trait for quoting against a concrete reserve pair

use crate::{AmmError, ConstantProduct, DEFAULT_LP_FEE_PER_MILLE};
use serde::{Deserialize, Serialize};

/// Everything a swap form needs to show for one quote
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub amount_out: u128,
    pub protocol_commission: u128,
    pub price_impact: f64,
    pub min_amount_out: u128,
}

/// Unified pool interface
pub trait AmmPool {
    /// Output amount for a given input
    fn amount_out(&self, amount_in: u128) -> Result<u128, AmmError>;

    /// Input required for a desired output
    fn amount_in(&self, amount_out: u128) -> Result<u128, AmmError>;

    /// Reserves as `(reserve_in, reserve_out)`
    fn reserves(&self) -> (u128, u128);

    fn lp_fee_per_mille(&self) -> u16;
}

/// Reserves of a pool oriented for one swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolReserves {
    pub reserve_in: u128,
    pub reserve_out: u128,
    pub lp_fee_per_mille: u16,
}

impl PoolReserves {
    pub fn new(reserve_in: u128, reserve_out: u128) -> Self {
        Self {
            reserve_in,
            reserve_out,
            lp_fee_per_mille: DEFAULT_LP_FEE_PER_MILLE,
        }
    }

    /// Same pool, opposite swap direction
    pub fn flipped(&self) -> Self {
        Self {
            reserve_in: self.reserve_out,
            reserve_out: self.reserve_in,
            lp_fee_per_mille: self.lp_fee_per_mille,
        }
    }

    pub fn has_liquidity(&self) -> bool {
        self.reserve_in > 0 && self.reserve_out > 0
    }

    /// Full quote: output, commission, impact against spot, and slippage guard
    pub fn quote(&self, amount_in: u128, slippage: f64) -> Result<SwapQuote, AmmError> {
        let output = ConstantProduct::amm_output(
            amount_in,
            self.reserve_in,
            self.reserve_out,
            self.lp_fee_per_mille,
        )?;
        let spot = ConstantProduct::spot_output(amount_in, self.reserve_in, self.reserve_out)?;

        Ok(SwapQuote {
            amount_out: output.amount_out,
            protocol_commission: output.protocol_commission,
            price_impact: ConstantProduct::price_impact(spot, output.amount_out),
            min_amount_out: ConstantProduct::min_amount_out(output.amount_out, slippage),
        })
    }
}

impl AmmPool for PoolReserves {
    fn amount_out(&self, amount_in: u128) -> Result<u128, AmmError> {
        ConstantProduct::amm_output(amount_in, self.reserve_in, self.reserve_out, self.lp_fee_per_mille)
            .map(|output| output.amount_out)
    }

    fn amount_in(&self, amount_out: u128) -> Result<u128, AmmError> {
        ConstantProduct::amm_input(amount_out, self.reserve_in, self.reserve_out, self.lp_fee_per_mille)
    }

    fn reserves(&self) -> (u128, u128) {
        (self.reserve_in, self.reserve_out)
    }

    fn lp_fee_per_mille(&self) -> u16 {
        self.lp_fee_per_mille
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_combines_formulas() {
        let pool = PoolReserves::new(1_000_000, 2_000_000);
        let quote = pool.quote(1_000, 0.01).unwrap();

        assert_eq!(quote.amount_out, 1_992);
        assert_eq!(quote.protocol_commission, 3);
        assert_eq!(quote.price_impact, -0.004);
        assert_eq!(quote.min_amount_out, 1_972);
    }

    #[test]
    fn test_flipped_round_trip() {
        let pool = PoolReserves::new(7, 11);
        assert_eq!(pool.flipped().reserves(), (11, 7));
        assert_eq!(pool.flipped().flipped(), pool);
    }

    #[test]
    fn test_trait_dispatch() {
        let pool: Box<dyn AmmPool> = Box::new(PoolReserves::new(0, 100));
        assert_eq!(pool.amount_out(10), Err(AmmError::NoLiquidity));
        assert_eq!(pool.lp_fee_per_mille(), DEFAULT_LP_FEE_PER_MILLE);
    }
}

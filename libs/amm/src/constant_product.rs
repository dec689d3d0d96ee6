//! Constant-product (x*y=k) swap math with asset-conversion rounding
//!
//! All intermediates are 512-bit so no product of `u128` inputs can overflow.
//! Divisions floor, exactly as the on-chain pallet does.

use crate::wide::{narrow, narrow_saturating, wide};
use crate::AmmError;
use primitive_types::U512;
use serde::{Deserialize, Serialize};

const PER_MILLE: u128 = 1_000;
const BPS: u128 = 10_000;

/// Result of a forward swap quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapOutput {
    pub amount_out: u128,
    /// Share of `amount_in` retained by the pool as LP fee
    pub protocol_commission: u128,
}

/// Constant-product math functions
pub struct ConstantProduct;

impl ConstantProduct {
    /// Output amount for `amount_in` sold into a pool
    ///
    /// `lp_fee_per_mille` is the LP fee in parts per thousand (3 = 0.3%).
    pub fn amm_output(
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
        lp_fee_per_mille: u16,
    ) -> Result<SwapOutput, AmmError> {
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::NoLiquidity);
        }
        let fee = Self::validate_fee(lp_fee_per_mille)?;

        let amount_in = wide(amount_in);
        let per_mille = wide(PER_MILLE);
        let with_fee = amount_in * wide(PER_MILLE - fee);
        let commission = (amount_in * per_mille - with_fee) / per_mille;

        let numerator = with_fee * wide(reserve_out);
        let denominator = wide(reserve_in) * per_mille + with_fee;

        Ok(SwapOutput {
            amount_out: narrow(numerator / denominator)?,
            protocol_commission: narrow(commission)?,
        })
    }

    /// Input required to receive exactly `amount_out`, rounded up by one planck
    pub fn amm_input(
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
        lp_fee_per_mille: u16,
    ) -> Result<u128, AmmError> {
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::NoLiquidity);
        }
        if amount_out == 0 {
            return Err(AmmError::ZeroAmount);
        }
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                requested: amount_out,
                available: reserve_out,
            });
        }
        let fee = Self::validate_fee(lp_fee_per_mille)?;

        let numerator = wide(reserve_in) * wide(amount_out) * wide(PER_MILLE);
        let denominator = wide(reserve_out - amount_out) * wide(PER_MILLE - fee);

        narrow(numerator / denominator + U512::one())
    }

    /// Fee-less output at the current spot price, the reference for price impact
    pub fn spot_output(amount_in: u128, reserve_in: u128, reserve_out: u128) -> Result<u128, AmmError> {
        if reserve_in == 0 || reserve_out == 0 {
            return Err(AmmError::NoLiquidity);
        }
        narrow(wide(amount_in) * wide(reserve_out) / wide(reserve_in))
    }

    /// Signed price impact of receiving `actual_out` instead of `spot_out`
    ///
    /// The ratio is computed in basis points with integer division (truncating
    /// toward zero) before the final float division, so `0.0` is returned for
    /// differences under one basis point. A worse-than-spot fill is negative.
    pub fn price_impact(spot_out: u128, actual_out: u128) -> f64 {
        if spot_out == 0 {
            return 0.0;
        }
        let spot = wide(spot_out);
        let (difference, worse) = if actual_out <= spot_out {
            (spot_out - actual_out, true)
        } else {
            (actual_out - spot_out, false)
        };

        let scaled = narrow_saturating(wide(difference) * wide(BPS) / spot);
        if scaled == 0 {
            return 0.0;
        }
        let ratio = scaled as f64 / BPS as f64;
        if worse {
            -ratio
        } else {
            ratio
        }
    }

    /// Minimum acceptable output for a slippage tolerance in `[0, 1]`
    ///
    /// Out-of-range tolerances are clamped; the tolerance is floored to whole
    /// basis points.
    pub fn min_amount_out(amount_out: u128, slippage: f64) -> u128 {
        let slippage = if slippage.is_nan() {
            0.0
        } else {
            slippage.clamp(0.0, 1.0)
        };
        let slippage_bps = ((slippage * BPS as f64).floor() as u128).min(BPS);

        // Never exceeds amount_out
        narrow_saturating(wide(amount_out) * wide(BPS - slippage_bps) / wide(BPS))
    }

    fn validate_fee(lp_fee_per_mille: u16) -> Result<u128, AmmError> {
        let fee = u128::from(lp_fee_per_mille);
        if fee >= PER_MILLE {
            return Err(AmmError::InvalidFee(lp_fee_per_mille));
        }
        Ok(fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amm_output_reference_pool() {
        let out = ConstantProduct::amm_output(1_000_000_000_000, 100_000_000_000_000, 200_000_000_000_000, 3)
            .unwrap();

        assert!(out.amount_out > 0);
        assert!(out.amount_out < 2_000_000_000_000);
        assert_eq!(out.protocol_commission, 3_000_000_000);
    }

    #[test]
    fn test_amm_output_exact_values() {
        // with_fee = 997_000, out = 997_000 * 2_000_000 / (1_000_000_000 + 997_000)
        let out = ConstantProduct::amm_output(1_000, 1_000_000, 2_000_000, 3).unwrap();
        assert_eq!(out.amount_out, 1_992);
        assert_eq!(out.protocol_commission, 3);

        // Commission floors to zero for dust
        let out = ConstantProduct::amm_output(100, 1_000_000, 2_000_000, 3).unwrap();
        assert_eq!(out.protocol_commission, 0);
    }

    #[test]
    fn test_amm_output_empty_pool() {
        assert_eq!(
            ConstantProduct::amm_output(1000, 0, 100, 3),
            Err(AmmError::NoLiquidity)
        );
        assert_eq!(
            ConstantProduct::amm_output(1000, 100, 0, 3),
            Err(AmmError::NoLiquidity)
        );
    }

    #[test]
    fn test_amm_output_rejects_full_fee() {
        assert_eq!(
            ConstantProduct::amm_output(1000, 100, 100, 1000),
            Err(AmmError::InvalidFee(1000))
        );
    }

    #[test]
    fn test_amm_output_handles_max_values() {
        let out = ConstantProduct::amm_output(u128::MAX, u128::MAX, u128::MAX, 3).unwrap();
        assert!(out.amount_out < u128::MAX);
    }

    #[test]
    fn test_amm_input_covers_requested_output() {
        let reserve_in = 50_000_000_000;
        let reserve_out = 80_000_000_000;
        let wanted = 1_234_567;

        let amount_in = ConstantProduct::amm_input(wanted, reserve_in, reserve_out, 3).unwrap();
        let out = ConstantProduct::amm_output(amount_in, reserve_in, reserve_out, 3).unwrap();
        assert!(out.amount_out >= wanted);

        let short = ConstantProduct::amm_output(amount_in - 2, reserve_in, reserve_out, 3).unwrap();
        assert!(short.amount_out < wanted);
    }

    #[test]
    fn test_amm_input_errors() {
        assert_eq!(
            ConstantProduct::amm_input(100, 1000, 100, 3),
            Err(AmmError::InsufficientLiquidity {
                requested: 100,
                available: 100
            })
        );
        assert_eq!(ConstantProduct::amm_input(0, 1000, 100, 3), Err(AmmError::ZeroAmount));
        assert_eq!(ConstantProduct::amm_input(10, 0, 100, 3), Err(AmmError::NoLiquidity));
    }

    #[test]
    fn test_spot_output() {
        assert_eq!(ConstantProduct::spot_output(1_000, 1_000_000, 2_000_000), Ok(2_000));
        assert_eq!(
            ConstantProduct::spot_output(1, 0, 10),
            Err(AmmError::NoLiquidity)
        );
    }

    #[test]
    fn test_price_impact_truncates_to_basis_points() {
        assert_eq!(ConstantProduct::price_impact(0, 100), 0.0);
        assert_eq!(ConstantProduct::price_impact(2_000, 1_992), -0.004);
        // 0.5 bps rounds toward zero, and never yields -0.0
        let impact = ConstantProduct::price_impact(20_000, 19_999);
        assert_eq!(impact, 0.0);
        assert!(impact.is_sign_positive());
        assert_eq!(ConstantProduct::price_impact(10_000, 10_100), 0.01);
    }

    #[test]
    fn test_min_amount_out() {
        assert_eq!(ConstantProduct::min_amount_out(10_000, 0.005), 9_950);
        assert_eq!(ConstantProduct::min_amount_out(10_000, 0.0), 10_000);
        assert_eq!(ConstantProduct::min_amount_out(10_000, 1.5), 0);
        assert_eq!(ConstantProduct::min_amount_out(10_000, -0.2), 10_000);
        assert_eq!(ConstantProduct::min_amount_out(10_000, f64::NAN), 10_000);
        assert_eq!(ConstantProduct::min_amount_out(u128::MAX, 0.0), u128::MAX);
    }
}

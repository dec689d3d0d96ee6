//! Caller-side sizing: app commission split and "max" button amounts

use crate::wide::{narrow_saturating, wide};
use serde::{Deserialize, Serialize};

/// Parts-per-million scale of `fee_percent * 10_000`
const COMMISSION_SCALE: u128 = 1_000_000;

/// Swap input split into the part that reaches the pool and the app fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCommission {
    pub net_in: u128,
    pub fee: u128,
}

/// Split `total_in` by an app commission given in percent (0.5 = 0.5%)
///
/// The percentage is rounded to 1/10_000 of a percent and clamped to
/// `[0, 100]`. `net_in + fee == total_in` always holds.
pub fn split_app_commission(total_in: u128, fee_percent: f64) -> AppCommission {
    let scaled = if fee_percent.is_nan() {
        0
    } else {
        (fee_percent * 10_000.0).round().clamp(0.0, COMMISSION_SCALE as f64) as u128
    };
    let fee = narrow_saturating(wide(total_in) * wide(scaled) / wide(COMMISSION_SCALE));

    AppCommission {
        net_in: total_in - fee,
        fee,
    }
}

/// Largest amount a user may swap out of `balance`
///
/// Native balances keep two fee estimates plus the existential deposit so the
/// account stays alive after paying for the swap. Floors at zero.
pub fn max_swap_amount(
    balance: u128,
    fee_estimate: u128,
    existential_deposit: u128,
    is_native: bool,
) -> u128 {
    if !is_native {
        return balance;
    }
    let reserved = fee_estimate
        .saturating_mul(2)
        .saturating_add(existential_deposit);
    balance.saturating_sub(reserved)
}

//! Constant-Product Property Tests
//!
//! Properties that must hold for any pool state, checked against the exact
//! integer formulas.

use amm::{split_app_commission, ConstantProduct, LiquidityMath, PoolReserves};
use proptest::prelude::*;

prop_compose! {
    fn valid_reserves()
        (reserve in 1u128..1_000_000_000_000_000_000u128) -> u128 {
        reserve
    }
}

prop_compose! {
    fn valid_amount()
        (amount in 0u128..1_000_000_000_000_000_000u128) -> u128 {
        amount
    }
}

prop_compose! {
    fn valid_fee()
        (fee in 0u16..30u16) -> u16 {
        fee
    }
}

prop_compose! {
    fn ordered_amounts()
        (first in valid_amount(), second in valid_amount()) -> (u128, u128) {
        (first.min(second), first.max(second))
    }
}

proptest! {
    /// Property: a swap never drains the output reserve
    #[test]
    fn output_bounded_by_reserve(
        amount_in in valid_amount(),
        reserve_in in valid_reserves(),
        reserve_out in valid_reserves(),
        fee in valid_fee(),
    ) {
        let out = ConstantProduct::amm_output(amount_in, reserve_in, reserve_out, fee).unwrap();
        prop_assert!(out.amount_out < reserve_out);
    }

    /// Property: the commission is exactly the floored fee share of the input
    #[test]
    fn commission_matches_fee_share(
        amount_in in valid_amount(),
        reserve_in in valid_reserves(),
        reserve_out in valid_reserves(),
        fee in valid_fee(),
    ) {
        let out = ConstantProduct::amm_output(amount_in, reserve_in, reserve_out, fee).unwrap();
        prop_assert_eq!(out.protocol_commission, amount_in * u128::from(fee) / 1000);
        prop_assert!(out.protocol_commission <= amount_in);
    }

    /// Property: selling more never returns less
    #[test]
    fn output_monotone_in_input(
        (small, large) in ordered_amounts(),
        reserve_in in valid_reserves(),
        reserve_out in valid_reserves(),
        fee in valid_fee(),
    ) {
        let low = ConstantProduct::amm_output(small, reserve_in, reserve_out, fee).unwrap();
        let high = ConstantProduct::amm_output(large, reserve_in, reserve_out, fee).unwrap();
        prop_assert!(low.amount_out <= high.amount_out);
    }

    /// Property: the average rate does not improve with size, up to one planck of flooring
    #[test]
    fn marginal_rate_non_increasing(
        (small, large) in ordered_amounts(),
        reserve_in in valid_reserves(),
        reserve_out in valid_reserves(),
        fee in valid_fee(),
    ) {
        prop_assume!(small > 0);
        let low = ConstantProduct::amm_output(small, reserve_in, reserve_out, fee).unwrap();
        let high = ConstantProduct::amm_output(large, reserve_in, reserve_out, fee).unwrap();

        // high/large <= (low + 1)/small, cross-multiplied; both sides stay below 1e36
        prop_assert!(high.amount_out * small <= (low.amount_out + 1) * large);
    }

    /// Property: the reverse quote always buys at least the requested output
    #[test]
    fn reverse_quote_is_sufficient(
        reserve_in in valid_reserves(),
        reserve_out in 2u128..1_000_000_000_000_000_000u128,
        wanted_fraction in 1u128..1000u128,
        fee in valid_fee(),
    ) {
        let wanted = (reserve_out * wanted_fraction / 1000).max(1);
        prop_assume!(wanted < reserve_out);

        let pool = PoolReserves { reserve_in, reserve_out, lp_fee_per_mille: fee };
        let amount_in = ConstantProduct::amm_input(wanted, reserve_in, reserve_out, fee).unwrap();
        let out = ConstantProduct::amm_output(amount_in, pool.reserve_in, pool.reserve_out, fee).unwrap();
        prop_assert!(out.amount_out >= wanted);
    }

    /// Property: a fill is never better than spot, so impact is never positive
    #[test]
    fn price_impact_non_positive(
        amount_in in valid_amount(),
        reserve_in in valid_reserves(),
        reserve_out in valid_reserves(),
    ) {
        let quote = PoolReserves::new(reserve_in, reserve_out).quote(amount_in, 0.005).unwrap();
        prop_assert!(quote.price_impact <= 0.0);
        prop_assert!(quote.price_impact >= -1.0);
        prop_assert!(quote.min_amount_out <= quote.amount_out);
    }

    /// Property: the app commission split conserves the input
    #[test]
    fn commission_conservation(
        total_in in any::<u128>(),
        fee_percent in 0.0f64..100.0f64,
    ) {
        let split = split_app_commission(total_in, fee_percent);
        prop_assert_eq!(split.net_in + split.fee, total_in);
    }

    /// Property: withdrawing minted shares never returns more than was deposited
    #[test]
    fn deposit_then_withdraw_never_profits(
        reserve1 in 1_000u128..1_000_000_000_000u128,
        reserve2 in 1_000u128..1_000_000_000_000u128,
        supply in 1_000u128..1_000_000_000_000u128,
        amount1 in 1u128..1_000_000_000u128,
    ) {
        let amount2 = LiquidityMath::quote_liquidity(amount1, reserve1, reserve2).unwrap();
        prop_assume!(amount2 > 0);
        let Ok(minted) = LiquidityMath::lp_tokens_for_deposit(amount1, amount2, reserve1, reserve2, supply) else {
            return Ok(());
        };

        let (back1, back2) = LiquidityMath::withdrawal_amounts(
            minted,
            reserve1 + amount1,
            reserve2 + amount2,
            supply + minted,
        ).unwrap();
        prop_assert!(back1 <= amount1);
        prop_assert!(back2 <= amount2);
    }
}

#[test]
fn reference_pool_scenario() {
    let out = ConstantProduct::amm_output(1_000_000_000_000, 100_000_000_000_000, 200_000_000_000_000, 3)
        .unwrap();
    assert!(out.amount_out > 0 && out.amount_out < 2_000_000_000_000);
    assert!(out.protocol_commission > 0);
}

//! Pool reserves read from the balance cache, and swap quotes built on them

use crate::balances::BalanceKey;
use crate::pools::reserve_keys;
use crate::DomainError;
use amm::{PoolReserves, SwapQuote};
use chain_state::CombinedState;
use types::{Planck, Pool, TokenId};

/// Reserves of `pool` oriented for selling `token_in`
///
/// Reads the owner's balances of both pooled tokens from a balance engine
/// snapshot. Stale values are used as they are; missing ones are an error.
pub fn pool_reserves(
    pool: &Pool,
    token_in: &TokenId,
    balances: &CombinedState<BalanceKey, Planck>,
) -> Result<PoolReserves, DomainError> {
    let [first, second] = reserve_keys(pool);
    let (key_in, key_out) = if &first.token == token_in {
        (first, second)
    } else if &second.token == token_in {
        (second, first)
    } else {
        return Err(DomainError::TokenNotInPool {
            token: token_in.clone(),
            pool_asset_id: pool.pool_asset_id,
        });
    };

    let reserve = |key: &BalanceKey| -> Result<u128, DomainError> {
        balances
            .get(key)
            .and_then(|entry| entry.value)
            .map(Planck::get)
            .ok_or_else(|| DomainError::ReserveNotLoaded(key.to_string()))
    };

    Ok(PoolReserves::new(reserve(&key_in)?, reserve(&key_out)?))
}

/// Quote selling `amount_in` of `token_in` into `pool`
pub fn quote_swap(
    pool: &Pool,
    token_in: &TokenId,
    amount_in: Planck,
    slippage: f64,
    balances: &CombinedState<BalanceKey, Planck>,
) -> Result<SwapQuote, DomainError> {
    let reserves = pool_reserves(pool, token_in, balances)?;
    Ok(reserves.quote(amount_in.get(), slippage)?)
}

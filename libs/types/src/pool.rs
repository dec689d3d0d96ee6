//! Liquidity pool descriptors
//!
//! A pool does not carry its reserves. The reserves are the pool owner's
//! balances of the two pooled tokens and live in the balance cache.

use crate::{Address, ChainId, TokenId};
use serde::{Deserialize, Serialize};

/// Asset-conversion pool as listed on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub chain_id: ChainId,
    pub pool_asset_id: u32,
    pub token_ids: [TokenId; 2],
    pub owner: Address,
}

impl Pool {
    /// LP token minted by this pool
    pub fn lp_token(&self) -> TokenId {
        TokenId::pool_asset(self.chain_id.clone(), self.pool_asset_id)
    }

    pub fn contains(&self, token: &TokenId) -> bool {
        self.token_ids.contains(token)
    }

    /// Whether this pool trades `a` against `b`, in either order
    pub fn matches_pair(&self, a: &TokenId, b: &TokenId) -> bool {
        a != b && self.contains(a) && self.contains(b)
    }

    /// The counterpart of `token` in this pool
    pub fn other_token(&self, token: &TokenId) -> Option<&TokenId> {
        match &self.token_ids {
            [first, second] if first == token => Some(second),
            [first, second] if second == token => Some(first),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pool() -> Pool {
        let chain = ChainId::new("pah").unwrap();
        Pool {
            chain_id: chain.clone(),
            pool_asset_id: 12,
            token_ids: [TokenId::native(chain.clone()), TokenId::asset(chain, 1984)],
            owner: Address::new("13UVJyLnbVp9RBZYFwFGyDvVd1y27Tt8tkntv6Q7JVPhFsTB").unwrap(),
        }
    }

    #[test]
    fn test_pair_helpers() {
        let pool = sample_pool();
        let [native, usdt] = pool.token_ids.clone();

        assert!(pool.matches_pair(&usdt, &native));
        assert!(!pool.matches_pair(&native, &native));
        assert_eq!(pool.other_token(&native), Some(&usdt));
        assert_eq!(pool.other_token(&pool.lp_token()), None);
        assert_eq!(pool.lp_token().to_string(), "pool-asset::pah::12");
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample_pool()).unwrap();
        assert_eq!(json["poolAssetId"], 12);
        assert_eq!(json["tokenIds"][1], "asset::pah::1984");
    }
}

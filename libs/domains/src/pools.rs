//! Asset-conversion pool lists per chain

use crate::api::{self, Source};
use crate::balances::BalanceKey;
use chain_state::{Domain, WatchRequest};
use types::{ChainId, Pool, TokenId};

pub struct PoolsDomain {
    source: Source<ChainId, Vec<Pool>>,
}

impl PoolsDomain {
    pub fn new(source: Source<ChainId, Vec<Pool>>) -> Self {
        Self { source }
    }
}

impl Domain for PoolsDomain {
    type Key = ChainId;
    type Value = Vec<Pool>;

    fn name(&self) -> &'static str {
        "pools"
    }

    /// Bumped whenever the persisted pool layout changes
    fn namespace(&self) -> &str {
        "pools::v3"
    }

    fn watch(&self, chain: &ChainId) -> WatchRequest<Vec<Pool>> {
        api::poll(&self.source, chain)
    }

    fn has_content(&self, pools: &Vec<Pool>) -> bool {
        !pools.is_empty()
    }
}

/// Pool trading `a` against `b`, in either order
pub fn find_pool<'a>(pools: &'a [Pool], a: &TokenId, b: &TokenId) -> Option<&'a Pool> {
    pools.iter().find(|pool| pool.matches_pair(a, b))
}

/// Balance keys holding the pool's reserves, in `token_ids` order
pub fn reserve_keys(pool: &Pool) -> [BalanceKey; 2] {
    let [a, b] = pool.token_ids.clone();
    [
        BalanceKey::new(pool.owner.clone(), a),
        BalanceKey::new(pool.owner.clone(), b),
    ]
}

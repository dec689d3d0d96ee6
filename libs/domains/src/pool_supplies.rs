//! LP token supply per pool, keyed by the unordered token pair

use crate::api::{self, Source};
use crate::DomainError;
use chain_state::{Domain, WatchRequest};
use std::fmt;
use std::str::FromStr;
use types::{Planck, Pool, TokenId, KEY_SEPARATOR};

/// Token pair of a pool, sorted so either argument order yields one key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolSupplyKey {
    pair: [TokenId; 2],
}

impl PoolSupplyKey {
    pub fn new(a: TokenId, b: TokenId) -> Self {
        let pair = if a <= b { [a, b] } else { [b, a] };
        Self { pair }
    }

    pub fn for_pool(pool: &Pool) -> Self {
        let [a, b] = pool.token_ids.clone();
        Self::new(a, b)
    }

    pub fn pair(&self) -> &[TokenId; 2] {
        &self.pair
    }
}

impl fmt::Display for PoolSupplyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.pair[0], KEY_SEPARATOR, self.pair[1])
    }
}

impl FromStr for PoolSupplyKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| DomainError::invalid_key(s, "expected <token>||<token>"))?;
        Ok(Self::new(a.parse()?, b.parse()?))
    }
}

pub struct PoolSuppliesDomain {
    source: Source<PoolSupplyKey, Planck>,
}

impl PoolSuppliesDomain {
    pub fn new(source: Source<PoolSupplyKey, Planck>) -> Self {
        Self { source }
    }
}

impl Domain for PoolSuppliesDomain {
    type Key = PoolSupplyKey;
    type Value = Planck;

    fn name(&self) -> &'static str {
        "pool-supplies"
    }

    fn namespace(&self) -> &str {
        "pool-supplies"
    }

    fn watch(&self, key: &PoolSupplyKey) -> WatchRequest<Planck> {
        api::push(&self.source, key)
    }

    fn has_content(&self, value: &Planck) -> bool {
        !value.is_zero()
    }
}

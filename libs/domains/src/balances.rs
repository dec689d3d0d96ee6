//! Account balances per token
//!
//! Configured balance overrides replace both snapshot and chain values for
//! their key.

use crate::api::{self, Source};
use crate::DomainError;
use chain_state::{Domain, WatchRequest};
use config::BalanceOverrideEntry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use types::{Address, Planck, TokenId, KEY_SEPARATOR};

/// Balance of one account in one token, encoded `<address>||<token>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceKey {
    pub address: Address,
    pub token: TokenId,
}

impl BalanceKey {
    pub fn new(address: Address, token: TokenId) -> Self {
        Self { address, token }
    }
}

impl fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.address, KEY_SEPARATOR, self.token)
    }
}

impl FromStr for BalanceKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, token) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| DomainError::invalid_key(s, "expected <address>||<token>"))?;
        Ok(Self {
            address: address.parse()?,
            token: token.parse()?,
        })
    }
}

pub struct BalancesDomain {
    source: Source<BalanceKey, Planck>,
    overrides: BTreeMap<BalanceKey, Planck>,
}

impl BalancesDomain {
    pub fn new(source: Source<BalanceKey, Planck>) -> Self {
        Self {
            source,
            overrides: BTreeMap::new(),
        }
    }

    /// Pin balances from configuration; malformed entries are skipped
    pub fn with_overrides(mut self, entries: &[BalanceOverrideEntry]) -> Self {
        for entry in entries {
            match parse_override(entry) {
                Ok((key, amount)) => {
                    self.overrides.insert(key, amount);
                }
                Err(err) => {
                    warn!(
                        "Ignoring balance override for '{}' / '{}': {}",
                        entry.address, entry.token_id, err
                    );
                }
            }
        }
        self
    }

    pub fn override_for(&self, key: &BalanceKey) -> Option<Planck> {
        self.overrides.get(key).copied()
    }
}

fn parse_override(entry: &BalanceOverrideEntry) -> Result<(BalanceKey, Planck), DomainError> {
    let key = BalanceKey::new(entry.address.parse()?, entry.token_id.parse()?);
    let amount = entry
        .plancks
        .parse::<u128>()
        .map_err(|err| DomainError::InvalidAmount {
            amount: entry.plancks.clone(),
            reason: err.to_string(),
        })?;
    Ok((key, Planck(amount)))
}

impl Domain for BalancesDomain {
    type Key = BalanceKey;
    type Value = Planck;

    fn name(&self) -> &'static str {
        "balances"
    }

    fn namespace(&self) -> &str {
        "balances"
    }

    fn watch(&self, key: &BalanceKey) -> WatchRequest<Planck> {
        api::push(&self.source, key)
    }

    fn has_content(&self, value: &Planck) -> bool {
        !value.is_zero()
    }

    fn apply_overlay(&self, key: &BalanceKey, value: Option<Planck>) -> Option<Planck> {
        self.override_for(key).or(value)
    }

    fn overlay_keys(&self) -> Vec<BalanceKey> {
        self.overrides.keys().cloned().collect()
    }
}

//! Token metadata with the built-in and configured overlays
//!
//! A fetched value passes through two layers before it is stored: built-in
//! known tokens replace whatever the chain reports, then configured overrides
//! patch individual fields. Both layers also apply to snapshot values at
//! startup, so they take effect without waiting for a fetch.

use crate::api::{self, Source};
use crate::known_tokens;
use chain_state::{Domain, WatchRequest};
use config::TokenOverrideEntry;
use std::collections::BTreeMap;
use tracing::warn;
use types::{TokenId, TokenInfo};

/// Field-level patch for one token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenOverride {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
    pub verified: Option<bool>,
}

impl TokenOverride {
    /// Patch `base`, or build a token from scratch when symbol, name and
    /// decimals are all set
    pub fn apply(&self, id: &TokenId, base: Option<TokenInfo>) -> Option<TokenInfo> {
        let mut info = match base {
            Some(info) => info,
            None => TokenInfo {
                id: id.clone(),
                symbol: self.symbol.clone()?,
                name: self.name.clone()?,
                decimals: self.decimals?,
                logo: None,
                verified: false,
            },
        };

        if let Some(symbol) = &self.symbol {
            info.symbol = symbol.clone();
        }
        if let Some(name) = &self.name {
            info.name = name.clone();
        }
        if let Some(decimals) = self.decimals {
            info.decimals = decimals;
        }
        if let Some(logo) = &self.logo {
            info.logo = Some(logo.clone());
        }
        if let Some(verified) = self.verified {
            info.verified = verified;
        }
        Some(info)
    }

    fn is_complete(&self) -> bool {
        self.symbol.is_some() && self.name.is_some() && self.decimals.is_some()
    }
}

impl From<&TokenOverrideEntry> for TokenOverride {
    fn from(entry: &TokenOverrideEntry) -> Self {
        Self {
            symbol: entry.symbol.clone(),
            name: entry.name.clone(),
            decimals: entry.decimals,
            logo: entry.logo.clone(),
            verified: entry.verified,
        }
    }
}

pub struct TokensDomain {
    source: Source<TokenId, Option<TokenInfo>>,
    overrides: BTreeMap<TokenId, TokenOverride>,
}

impl TokensDomain {
    pub fn new(source: Source<TokenId, Option<TokenInfo>>) -> Self {
        Self {
            source,
            overrides: BTreeMap::new(),
        }
    }

    /// Add configured overrides; entries with an unparsable token id are skipped
    pub fn with_overrides(mut self, entries: &[TokenOverrideEntry]) -> Self {
        for entry in entries {
            match entry.token_id.parse::<TokenId>() {
                Ok(id) => {
                    self.overrides.insert(id, TokenOverride::from(entry));
                }
                Err(err) => {
                    warn!("Ignoring token override for '{}': {}", entry.token_id, err);
                }
            }
        }
        self
    }

    pub fn override_for(&self, id: &TokenId) -> Option<&TokenOverride> {
        self.overrides.get(id)
    }
}

impl Domain for TokensDomain {
    type Key = TokenId;
    type Value = Option<TokenInfo>;

    fn name(&self) -> &'static str {
        "tokens"
    }

    fn namespace(&self) -> &str {
        "tokens"
    }

    fn watch(&self, id: &TokenId) -> WatchRequest<Option<TokenInfo>> {
        api::poll(&self.source, id)
    }

    fn has_content(&self, info: &Option<TokenInfo>) -> bool {
        info.is_some()
    }

    fn apply_overlay(
        &self,
        id: &TokenId,
        value: Option<Option<TokenInfo>>,
    ) -> Option<Option<TokenInfo>> {
        let value = match known_tokens::lookup(id) {
            Some(known) => Some(Some(known.clone())),
            None => value,
        };

        let Some(patch) = self.overrides.get(id) else {
            return value;
        };
        match patch.apply(id, value.clone().flatten()) {
            Some(info) => Some(Some(info)),
            None => value,
        }
    }

    fn overlay_keys(&self) -> Vec<TokenId> {
        let mut keys: Vec<TokenId> = known_tokens::ids().cloned().collect();
        keys.extend(
            self.overrides
                .iter()
                .filter(|(_, patch)| patch.is_complete())
                .map(|(id, _)| id.clone()),
        );
        keys.sort();
        keys.dedup();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chain_state::{BlockTag, ChainWatch, WatchError};
    use futures::stream::{self, BoxStream, StreamExt};
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl ChainWatch<TokenId, Option<TokenInfo>> for Offline {
        async fn get_value(&self, _id: &TokenId) -> Result<Option<TokenInfo>, WatchError> {
            Err(WatchError::Rpc("offline".into()))
        }

        fn watch_value(
            &self,
            _id: &TokenId,
            _at: BlockTag,
        ) -> BoxStream<'static, Result<Option<TokenInfo>, WatchError>> {
            stream::empty().boxed()
        }
    }

    fn domain(entries: &[TokenOverrideEntry]) -> TokensDomain {
        TokensDomain::new(Arc::new(Offline)).with_overrides(entries)
    }

    fn fetched(id: &TokenId, symbol: &str) -> TokenInfo {
        TokenInfo {
            id: id.clone(),
            symbol: symbol.into(),
            name: "Fetched".into(),
            decimals: 8,
            logo: None,
            verified: false,
        }
    }

    #[test]
    fn test_known_tokens_win_over_chain() {
        let domain = domain(&[]);
        let usdt: TokenId = "asset::pah::1984".parse().unwrap();

        let value = domain.apply_overlay(&usdt, Some(Some(fetched(&usdt, "FAKE"))));
        let info = value.flatten().unwrap();
        assert_eq!(info.symbol, "USDt");
        assert!(info.verified);

        // Present even when nothing was fetched or stored
        assert!(domain.apply_overlay(&usdt, None).flatten().is_some());
        assert!(domain.overlay_keys().contains(&usdt));
    }

    #[test]
    fn test_override_patches_fields() {
        let id: TokenId = "asset::pah::30".parse().unwrap();
        let domain = domain(&[TokenOverrideEntry {
            token_id: id.to_string(),
            logo: Some("ded.svg".into()),
            verified: Some(true),
            ..TokenOverrideEntry::default()
        }]);

        let info = domain
            .apply_overlay(&id, Some(Some(fetched(&id, "DED"))))
            .flatten()
            .unwrap();
        assert_eq!(info.symbol, "DED");
        assert_eq!(info.logo.as_deref(), Some("ded.svg"));
        assert!(info.verified);

        // A partial patch cannot invent a token
        assert_eq!(domain.apply_overlay(&id, Some(None)), Some(None));
        assert_eq!(domain.apply_overlay(&id, None), None);
        assert!(!domain.overlay_keys().contains(&id));
    }

    #[test]
    fn test_complete_override_defines_token() {
        let id: TokenId = "asset::kah::8".parse().unwrap();
        let domain = domain(&[TokenOverrideEntry {
            token_id: id.to_string(),
            symbol: Some("RMRK".into()),
            name: Some("RMRK.app".into()),
            decimals: Some(10),
            ..TokenOverrideEntry::default()
        }]);

        let info = domain.apply_overlay(&id, None).flatten().unwrap();
        assert_eq!(info.id, id);
        assert_eq!(info.decimals, 10);
        assert!(!info.verified);
        assert!(domain.overlay_keys().contains(&id));
    }

    #[test]
    fn test_invalid_override_ids_are_skipped() {
        let domain = domain(&[TokenOverrideEntry {
            token_id: "not-a-token".into(),
            symbol: Some("X".into()),
            ..TokenOverrideEntry::default()
        }]);
        assert!(domain.overrides.is_empty());
    }
}

//! Built-in metadata for tokens every Asset Hub deployment lists

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use types::{TokenId, TokenInfo};

/// (canonical id, symbol, name, decimals)
const KNOWN: &[(&str, &str, &str, u8)] = &[
    ("native::pah", "DOT", "Polkadot", 10),
    ("native::kah", "KSM", "Kusama", 12),
    ("native::wah", "WND", "Westend", 12),
    ("native::pasah", "PAS", "Paseo", 10),
    ("asset::pah::1984", "USDt", "Tether USD", 6),
    ("asset::pah::1337", "USDC", "USD Coin", 6),
];

static KNOWN_TOKENS: Lazy<BTreeMap<TokenId, TokenInfo>> = Lazy::new(|| {
    KNOWN
        .iter()
        .filter_map(|(id, symbol, name, decimals)| {
            let id: TokenId = id.parse().ok()?;
            let info = TokenInfo {
                id: id.clone(),
                symbol: symbol.to_string(),
                name: name.to_string(),
                decimals: *decimals,
                logo: None,
                verified: true,
            };
            Some((id, info))
        })
        .collect()
});

pub fn lookup(id: &TokenId) -> Option<&'static TokenInfo> {
    KNOWN_TOKENS.get(id)
}

pub fn ids() -> impl Iterator<Item = &'static TokenId> {
    KNOWN_TOKENS.keys()
}

//! Token identifiers and metadata
//!
//! Asset Hub chains carry four kinds of fungible tokens. Each kind gets its own
//! [`TokenId`] variant and a canonical string form:
//!
//! | Variant | Canonical form |
//! |---------|----------------|
//! | `Native` | `native::<chain>` |
//! | `Asset` | `asset::<chain>::<asset_id>` |
//! | `PoolAsset` | `pool-asset::<chain>::<pool_asset_id>` |
//! | `ForeignAsset` | `foreign-asset::<chain>::<location>` |
//!
//! Foreign asset locations are opaque (usually an encoded XCM location) and may
//! themselves contain `::`, so they are always the last segment.

use crate::{ChainId, TypeError, KEY_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind tag of a [`TokenId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Native,
    Asset,
    PoolAsset,
    ForeignAsset,
}

impl TokenKind {
    pub fn prefix(self) -> &'static str {
        match self {
            TokenKind::Native => "native",
            TokenKind::Asset => "asset",
            TokenKind::PoolAsset => "pool-asset",
            TokenKind::ForeignAsset => "foreign-asset",
        }
    }
}

/// Identifier of a fungible token on a given chain
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TokenId {
    Native { chain: ChainId },
    Asset { chain: ChainId, asset_id: u32 },
    PoolAsset { chain: ChainId, pool_asset_id: u32 },
    ForeignAsset { chain: ChainId, location: String },
}

impl TokenId {
    pub fn native(chain: ChainId) -> Self {
        TokenId::Native { chain }
    }

    pub fn asset(chain: ChainId, asset_id: u32) -> Self {
        TokenId::Asset { chain, asset_id }
    }

    pub fn pool_asset(chain: ChainId, pool_asset_id: u32) -> Self {
        TokenId::PoolAsset {
            chain,
            pool_asset_id,
        }
    }

    pub fn foreign_asset(chain: ChainId, location: impl Into<String>) -> Result<Self, TypeError> {
        let location = location.into();
        validate_location(&location).map_err(|reason| TypeError::token_id(&location, reason))?;
        Ok(TokenId::ForeignAsset { chain, location })
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            TokenId::Native { .. } => TokenKind::Native,
            TokenId::Asset { .. } => TokenKind::Asset,
            TokenId::PoolAsset { .. } => TokenKind::PoolAsset,
            TokenId::ForeignAsset { .. } => TokenKind::ForeignAsset,
        }
    }

    pub fn chain(&self) -> &ChainId {
        match self {
            TokenId::Native { chain }
            | TokenId::Asset { chain, .. }
            | TokenId::PoolAsset { chain, .. }
            | TokenId::ForeignAsset { chain, .. } => chain,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TokenId::Native { .. })
    }
}

fn validate_location(location: &str) -> Result<(), &'static str> {
    if location.is_empty() {
        return Err("empty foreign asset location");
    }
    if location.contains(KEY_SEPARATOR) {
        return Err("location must not contain '||'");
    }
    Ok(())
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.kind().prefix();
        match self {
            TokenId::Native { chain } => write!(f, "{prefix}::{chain}"),
            TokenId::Asset { chain, asset_id } => write!(f, "{prefix}::{chain}::{asset_id}"),
            TokenId::PoolAsset {
                chain,
                pool_asset_id,
            } => write!(f, "{prefix}::{chain}::{pool_asset_id}"),
            TokenId::ForeignAsset { chain, location } => write!(f, "{prefix}::{chain}::{location}"),
        }
    }
}

impl FromStr for TokenId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, "::");
        let kind = parts.next().unwrap_or_default();
        let chain = parts
            .next()
            .ok_or_else(|| TypeError::token_id(s, "missing chain"))?;
        let chain = ChainId::new(chain).map_err(|_| TypeError::token_id(s, "invalid chain"))?;
        let rest = parts.next();

        let parse_id = |rest: Option<&str>| -> Result<u32, TypeError> {
            rest.ok_or_else(|| TypeError::token_id(s, "missing numeric id"))?
                .parse::<u32>()
                .map_err(|_| TypeError::token_id(s, "numeric id expected"))
        };

        match kind {
            "native" => match rest {
                None => Ok(TokenId::Native { chain }),
                Some(_) => Err(TypeError::token_id(s, "native tokens take no id")),
            },
            "asset" => Ok(TokenId::Asset {
                chain,
                asset_id: parse_id(rest)?,
            }),
            "pool-asset" => Ok(TokenId::PoolAsset {
                chain,
                pool_asset_id: parse_id(rest)?,
            }),
            "foreign-asset" => {
                let location = rest.ok_or_else(|| TypeError::token_id(s, "missing location"))?;
                validate_location(location).map_err(|reason| TypeError::token_id(s, reason))?;
                Ok(TokenId::ForeignAsset {
                    chain,
                    location: location.to_string(),
                })
            }
            other => Err(TypeError::token_id(s, format!("unknown kind '{other}'"))),
        }
    }
}

impl TryFrom<String> for TokenId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenId> for String {
    fn from(id: TokenId) -> Self {
        id.to_string()
    }
}

/// Token metadata as displayed to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub id: TokenId,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pah() -> ChainId {
        ChainId::new("pah").unwrap()
    }

    #[test]
    fn test_canonical_forms_round_trip() {
        let ids = vec![
            TokenId::native(pah()),
            TokenId::asset(pah(), 1984),
            TokenId::pool_asset(pah(), 7),
            TokenId::foreign_asset(pah(), r#"{"parents":2,"interior":{"x1":[{"globalConsensus":"kusama"}]}}"#)
                .unwrap(),
        ];

        for id in ids {
            let encoded = id.to_string();
            let decoded: TokenId = encoded.parse().unwrap();
            assert_eq!(decoded, id, "round trip failed for {encoded}");
        }
    }

    #[test]
    fn test_foreign_location_may_contain_double_colon() {
        let id: TokenId = "foreign-asset::pah::a::b::c".parse().unwrap();
        match id {
            TokenId::ForeignAsset { location, .. } => assert_eq!(location, "a::b::c"),
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for bad in [
            "",
            "native",
            "native::pah::1",
            "asset::pah",
            "asset::pah::abc",
            "pool-asset::pah::-1",
            "foreign-asset::pah",
            "foreign-asset::pah::a||b",
            "nft::pah::1",
        ] {
            assert!(bad.parse::<TokenId>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_kind_and_chain() {
        let id = TokenId::pool_asset(pah(), 3);
        assert_eq!(id.kind(), TokenKind::PoolAsset);
        assert_eq!(id.chain(), &pah());
        assert!(!id.is_native());
        assert!(TokenId::native(pah()).is_native());
    }

    #[test]
    fn test_token_info_serializes_id_as_string() {
        let info = TokenInfo {
            id: TokenId::asset(pah(), 1984),
            symbol: "USDt".into(),
            name: "Tether USD".into(),
            decimals: 6,
            logo: None,
            verified: true,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["id"], "asset::pah::1984");
        assert!(json.get("logo").is_none());

        let back: TokenInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
    }
}

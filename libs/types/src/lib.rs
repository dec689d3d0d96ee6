//! # Tidewatch Types
//!
//! Shared vocabulary for the chain-state engines and the AMM math.
//!
//! ## Design Philosophy
//!
//! - **Canonical Encodings**: Every identifier has exactly one string form
//!   (`Display`/`FromStr` round-trip), so equal requests collapse to one cache key
//! - **Exhaustive Token Kinds**: [`TokenId`] is a sum type; callers `match` on it
//!   instead of probing for fields
//! - **No Precision Loss**: Balances and supplies are [`Planck`] (`u128`) and are
//!   persisted with the `bigint:` tag once they leave the 53-bit safe range
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{ChainId, Planck, TokenId};
//!
//! let usdt: TokenId = "asset::pah::1984".parse().unwrap();
//! assert_eq!(usdt.chain(), &ChainId::new("pah").unwrap());
//! assert_eq!(usdt.to_string(), "asset::pah::1984");
//!
//! let amount = Planck::new(1_500_000);
//! assert_eq!(amount.to_decimal(6).unwrap().to_string(), "1.500000");
//! ```

pub mod chain;
pub mod error;
pub mod planck;
pub mod pool;
pub mod token;

pub use chain::{Address, ChainId};
pub use error::TypeError;
pub use planck::{Planck, BIGINT_TAG, MAX_SAFE_INTEGER};
pub use pool::Pool;
pub use token::{TokenId, TokenInfo, TokenKind};

/// Separator used between the parts of a composite cache key
pub const KEY_SEPARATOR: &str = "||";

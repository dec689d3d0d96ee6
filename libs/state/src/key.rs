//! Cache key bound

use crate::error::KeyError;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

/// Key of a cache entry
///
/// The `Display` form is the canonical encoding used in persisted snapshots;
/// it must round-trip through [`CacheKey::parse_key`]. Implemented for every
/// type with a fallible `FromStr`.
pub trait CacheKey: Clone + Ord + Hash + Debug + Display + Send + Sync + 'static {
    fn parse_key(encoded: &str) -> Result<Self, KeyError>;
}

impl<T> CacheKey for T
where
    T: Clone + Ord + Hash + Debug + Display + FromStr + Send + Sync + 'static,
    T::Err: Display,
{
    fn parse_key(encoded: &str) -> Result<Self, KeyError> {
        encoded.parse().map_err(|err: T::Err| KeyError {
            key: encoded.to_string(),
            reason: err.to_string(),
        })
    }
}

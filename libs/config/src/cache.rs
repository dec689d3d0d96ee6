//! Per-engine cache timing
//!
//! Every chain-state engine reads one [`CacheSettings`] section. Values are
//! stored as milliseconds so they map one-to-one onto TOML and environment
//! variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timings shared by all engines
pub mod defaults {
    /// Window collapsing subscription churn into one demand change
    pub const DEMAND_DEBOUNCE_MS: u64 = 100;
    /// Window collecting store writes into one snapshot write
    pub const PERSIST_DEBOUNCE_MS: u64 = 1_000;
    /// Lifetime of a polled value before it is refetched
    pub const CACHE_DURATION_MS: u64 = 300_000;
    /// Upper bound on a single poll fetch
    pub const FETCH_TIMEOUT_MS: u64 = 10_000;
    pub const RETRY_INITIAL_MS: u64 = 3_000;
    pub const RETRY_MAX_MS: u64 = 60_000;
    pub const RETRY_MULTIPLIER: f64 = 2.0;
}

/// Timing knobs of one engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub demand_debounce_ms: u64,
    pub persist_debounce_ms: u64,
    pub cache_duration_ms: u64,
    pub fetch_timeout_ms: u64,
    pub retry_initial_ms: u64,
    pub retry_max_ms: u64,
    pub retry_multiplier: f64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            demand_debounce_ms: defaults::DEMAND_DEBOUNCE_MS,
            persist_debounce_ms: defaults::PERSIST_DEBOUNCE_MS,
            cache_duration_ms: defaults::CACHE_DURATION_MS,
            fetch_timeout_ms: defaults::FETCH_TIMEOUT_MS,
            retry_initial_ms: defaults::RETRY_INITIAL_MS,
            retry_max_ms: defaults::RETRY_MAX_MS,
            retry_multiplier: defaults::RETRY_MULTIPLIER,
        }
    }
}

impl CacheSettings {
    pub fn demand_debounce(&self) -> Duration {
        Duration::from_millis(self.demand_debounce_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_millis(self.cache_duration_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Delay before restart attempt number `attempt` (0-based)
    ///
    /// `retry_initial * retry_multiplier^attempt`, capped at `retry_max`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let max = self.retry_max_ms as f64;
        let multiplier = if self.retry_multiplier.is_finite() && self.retry_multiplier >= 1.0 {
            self.retry_multiplier
        } else {
            1.0
        };

        let exponent = attempt.min(64) as i32;
        let delay = self.retry_initial_ms as f64 * multiplier.powi(exponent);
        Duration::from_millis(delay.min(max) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let settings = CacheSettings::default();
        let delays: Vec<u64> = (0..7).map(|n| settings.backoff(n).as_millis() as u64).collect();
        assert_eq!(delays, vec![3_000, 6_000, 12_000, 24_000, 48_000, 60_000, 60_000]);
        assert_eq!(settings.backoff(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn test_backoff_ignores_shrinking_multiplier() {
        let settings = CacheSettings {
            retry_multiplier: 0.5,
            ..CacheSettings::default()
        };
        assert_eq!(settings.backoff(4), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let settings: CacheSettings = toml::from_str("fetch_timeout_ms = 2500").unwrap();
        assert_eq!(settings.fetch_timeout(), Duration::from_millis(2_500));
        assert_eq!(settings.demand_debounce(), Duration::from_millis(100));
        assert_eq!(settings.cache_duration(), Duration::from_secs(300));
    }
}

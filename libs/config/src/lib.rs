//! # Tidewatch Configuration
//!
//! Layered configuration for the chain-state engines and the process that
//! embeds them.
//!
//! ## Features
//!
//! - **Cache Timing**: Debounce windows, poll lifetimes, fetch timeouts and
//!   retry backoff per engine ([`CacheSettings`])
//! - **Application Settings**: Persistence namespace, storage directory and
//!   token metadata overrides ([`AppConfig`])
//! - **Logging**: `tracing-subscriber` initialisation ([`init_tracing`])
//!
//! ## Usage
//!
//! ```no_run
//! use config::{init_tracing, AppConfig};
//!
//! let app_config = AppConfig::load(None, Some("production"))?;
//! init_tracing(&app_config.logging)?;
//! let retry = app_config.balances.backoff(0);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app_config;
pub mod cache;
pub mod logging;

// Re-export commonly used types
pub use app_config::{
    load_config, AppConfig, AppSection, BalanceOverrideEntry, TokenOverrideEntry,
};
pub use cache::{defaults, CacheSettings};
pub use logging::{init_tracing, LoggingConfig};

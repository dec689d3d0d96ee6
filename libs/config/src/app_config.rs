//! Application Configuration Module
//!
//! Loads the Tidewatch configuration from a TOML file, an optional
//! environment overlay and `TIDEWATCH__*` environment variables, in that
//! order of precedence.

use crate::cache::CacheSettings;
use crate::logging::LoggingConfig;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default location of the base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/tidewatch.toml";

/// Prefix of environment overrides, e.g. `TIDEWATCH__TOKENS__FETCH_TIMEOUT_MS`
pub const ENV_PREFIX: &str = "TIDEWATCH";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub logging: LoggingConfig,
    pub balances: CacheSettings,
    pub pools: CacheSettings,
    pub pool_supplies: CacheSettings,
    pub tokens: CacheSettings,
    /// Field-level patches applied on top of fetched and built-in token metadata
    pub token_overrides: Vec<TokenOverrideEntry>,
    /// Curated balances that replace what the chain reports
    pub balance_overrides: Vec<BalanceOverrideEntry>,
}

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Prefix of every persisted snapshot key
    pub namespace: String,
    /// Directory holding the snapshot files
    pub storage_dir: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            namespace: "tidewatch".to_string(),
            storage_dir: PathBuf::from("~/.local/share/tidewatch"),
        }
    }
}

/// Token metadata patch; unset fields keep the underlying value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenOverrideEntry {
    /// Canonical token id, e.g. `asset::pah::1984`
    pub token_id: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
    pub verified: Option<bool>,
}

/// Fixed balance for one account and token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceOverrideEntry {
    pub address: String,
    /// Canonical token id, e.g. `native::pah`
    pub token_id: String,
    /// Decimal planck amount; a string since TOML integers stop at 64 bits
    pub plancks: String,
}

impl AppConfig {
    /// Load configuration from files with environment overrides
    ///
    /// A missing base file is allowed when no path is given explicitly; every
    /// field has a default. The environment overlay is looked up in an
    /// `environments/` directory next to the base file.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder()
            .add_source(File::from(base).format(FileFormat::Toml).required(base_path.is_some()));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file).format(FileFormat::Toml));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app_config.expand_env_vars()?;

        debug!(
            namespace = %app_config.app.namespace,
            storage_dir = ?app_config.app.storage_dir,
            "Configuration loaded"
        );
        Ok(app_config)
    }

    /// Parse a configuration from TOML text, without environment overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut app_config: AppConfig =
            toml::from_str(content).context("Failed to parse configuration")?;
        app_config.expand_env_vars()?;
        Ok(app_config)
    }

    /// Expand `~` and `$VAR` in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        let raw = self.app.storage_dir.to_string_lossy().into_owned();
        let expanded = shellexpand::full(&raw).context("Failed to expand storage directory")?;
        self.app.storage_dir = PathBuf::from(expanded.as_ref());
        Ok(())
    }
}

/// Convenience function to load configuration from the default location
pub fn load_config(environment: Option<&str>) -> Result<AppConfig> {
    AppConfig::load(None, environment)
}

//! Application settings loaded from `config.toml` and the environment.
//!
//! Every field has a default so a missing file yields a working configuration.
//! Environment variables (usually from `.env`) override the file for the values
//! that differ between deployments: database location and remote endpoints.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Public makeup catalog used when nothing else is configured.
pub const DEFAULT_CATALOG_URL: &str = "https://makeup-api.herokuapp.com/api/v1/products.json";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Remote product catalog settings
    pub catalog: CatalogConfig,
    /// Search coordinator settings
    pub search: SearchConfig,
    /// Home feed settings
    pub home: HomeConfig,
    /// Price display settings
    pub pricing: PricingConfig,
    /// Review synchronisation settings
    pub reviews: ReviewsConfig,
}

/// Remote product catalog settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    /// Endpoint queried with `?brand=` or `?product_type=`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl CatalogConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Search coordinator settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a typed query is dispatched
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

impl SearchConfig {
    /// Debounce window as a `Duration`.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Home feed settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HomeConfig {
    /// Brand loaded on the home screen
    pub featured_brand: String,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            featured_brand: "maybelline".to_string(),
        }
    }
}

/// Price display settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    /// Multiplier from catalog price to display currency
    pub exchange_rate: f64,
    /// Symbol prefixed to displayed prices
    pub currency_symbol: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            exchange_rate: crate::models::product::TENGE_RATE,
            currency_symbol: crate::models::product::TENGE_SYMBOL.to_string(),
        }
    }
}

/// Review synchronisation settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReviewsConfig {
    /// Base URL of the realtime database; `None` keeps reviews in process
    pub realtime_url: Option<String>,
    /// How often a remote review collection is re-read
    pub poll_interval_ms: u64,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            realtime_url: None,
            poll_interval_ms: 2000,
        }
    }
}

impl ReviewsConfig {
    /// Poll interval as a `Duration`.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Loads settings from a TOML file, falling back to defaults when the file is absent.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        tracing::info!("No config file at {:?}, using defaults", path_ref);
        return Ok(AppConfig::default());
    }

    tracing::debug!("Loading configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns an error if the text is not valid TOML for [`AppConfig`].
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads `./config.toml` and applies environment overrides.
///
/// # Errors
/// Returns an error if the config file exists but is invalid.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = load_config("config.toml")?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Applies `CATALOG_BASE_URL` and `REALTIME_DB_URL` from the environment.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = std::env::var("CATALOG_BASE_URL") {
        config.catalog.base_url = url;
    }
    if let Ok(url) = std::env::var("REALTIME_DB_URL") {
        config.reviews.realtime_url = Some(url);
    }
}

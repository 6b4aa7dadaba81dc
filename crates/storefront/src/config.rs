//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `POCKET_SHOP_DATA_FILE` - Path of the JSON store file (default: pocket-shop.json)
//! - `POCKET_SHOP_SHIPPING_BASE` - Flat shipping fee (default: 5000)
//! - `POCKET_SHOP_FREE_SHIPPING_OVER` - Subtotal above which shipping is free
//!   (default: 100000; `off`, `none` or empty disables the waiver)
//! - `POCKET_SHOP_LOG_JSON` - Emit logs as JSON lines (default: false)

use std::path::PathBuf;

use thiserror::Error;

use pocket_shop_core::Money;

use crate::pricing::ShippingPolicy;

const DEFAULT_DATA_FILE: &str = "pocket-shop.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    /// Backing file for the file store
    pub data_file: PathBuf,
    /// Shipping rule applied to cart totals and orders
    pub shipping: ShippingPolicy,
    /// Whether the CLI should log JSON lines
    pub log_json: bool,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            shipping: ShippingPolicy::default(),
            log_json: false,
        }
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = PathBuf::from(get_env_or_default(
            &lookup,
            "POCKET_SHOP_DATA_FILE",
            DEFAULT_DATA_FILE,
        ));

        let base = match lookup("POCKET_SHOP_SHIPPING_BASE") {
            Some(raw) => parse_money("POCKET_SHOP_SHIPPING_BASE", &raw)?,
            None => Money::from_units(ShippingPolicy::DEFAULT_BASE),
        };

        let free_over = match lookup("POCKET_SHOP_FREE_SHIPPING_OVER") {
            Some(raw) if is_disabled(&raw) => None,
            Some(raw) => Some(parse_money("POCKET_SHOP_FREE_SHIPPING_OVER", &raw)?),
            None => Some(Money::from_units(ShippingPolicy::DEFAULT_FREE_OVER)),
        };

        let log_json = match lookup("POCKET_SHOP_LOG_JSON") {
            Some(raw) => parse_bool("POCKET_SHOP_LOG_JSON", &raw)?,
            None => false,
        };

        Ok(Self {
            data_file,
            shipping: ShippingPolicy { base, free_over },
            log_json,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn is_disabled(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.eq_ignore_ascii_case("off") || raw.eq_ignore_ascii_case("none")
}

fn parse_money(key: &str, raw: &str) -> Result<Money, ConfigError> {
    Money::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

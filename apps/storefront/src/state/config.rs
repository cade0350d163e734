//! Storefront configuration.
//!
//! Configuration is loaded from `FARMEASE_*` environment variables (a
//! `.env` file is honored by the binary) with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::services::{EmailJsConfig, SupabaseConfig};

pub const DEFAULT_PAYMENT_DELAY_MS: u64 = 2000;
pub const DEFAULT_CART_KEY: &str = "cart";
pub const DEFAULT_SESSION_KEY: &str = "session";

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// SQLite file; `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Hosted backend. `None` runs against the local catalog.
    pub supabase: Option<SupabaseConfig>,

    pub emailjs: EmailJsConfig,

    /// Stand-in for the payment authorization round-trip.
    pub payment_delay: Duration,

    /// Storage key of the persisted cart snapshot.
    pub cart_key: String,

    /// Storage key of the persisted session.
    pub session_key: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            db_path: None,
            supabase: None,
            emailjs: EmailJsConfig::default(),
            payment_delay: Duration::from_millis(DEFAULT_PAYMENT_DELAY_MS),
            cart_key: DEFAULT_CART_KEY.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let supabase = match (var("FARMEASE_SUPABASE_URL"), var("FARMEASE_SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig { url, anon_key }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired(
                    "FARMEASE_SUPABASE_ANON_KEY".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingRequired(
                    "FARMEASE_SUPABASE_URL".to_string(),
                ))
            }
        };

        let payment_delay_ms = match var("FARMEASE_PAYMENT_DELAY_MS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue("FARMEASE_PAYMENT_DELAY_MS".to_string())
            })?,
            None => DEFAULT_PAYMENT_DELAY_MS,
        };

        Ok(StorefrontConfig {
            db_path: var("FARMEASE_DB_PATH").map(PathBuf::from),
            supabase,
            emailjs: EmailJsConfig {
                service_id: var("FARMEASE_EMAILJS_SERVICE_ID"),
                template_id: var("FARMEASE_EMAILJS_TEMPLATE_ID"),
                public_key: var("FARMEASE_EMAILJS_PUBLIC_KEY"),
            },
            payment_delay: Duration::from_millis(payment_delay_ms),
            cart_key: var("FARMEASE_CART_KEY").unwrap_or_else(|| DEFAULT_CART_KEY.to_string()),
            session_key: DEFAULT_SESSION_KEY.to_string(),
        })
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),

    #[error("Missing required environment variable: {0}")]
    MissingRequired(String),
}

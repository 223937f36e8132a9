//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKETPLACE_API_BASE_URL` - Base URL of the catalog backend
//!
//! ## Optional
//! - `MARKETPLACE_STATE_DIR` - Directory for the local state file
//!   (default: `.marketplace`)
//! - `MARKETPLACE_API_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `MARKETPLACE_CATALOG_CACHE_SECS` - Product/category cache TTL
//!   (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use marketplace_core::storage::{FileStore, StorageError};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog backend configuration
    pub catalog: CatalogConfig,
    /// Directory holding the local state file
    pub state_dir: PathBuf,
}

/// Catalog backend configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog REST API
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// TTL for cached product/category reads
    pub cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let catalog = CatalogConfig::from_env()?;
        let state_dir = PathBuf::from(get_env_or_default("MARKETPLACE_STATE_DIR", ".marketplace"));

        Ok(Self { catalog, state_dir })
    }

    /// Path of the local state file under the state directory.
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("local_state.json")
    }

    /// Open the file-backed storage medium at the configured location.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the state directory cannot be created.
    pub fn open_state_store(&self) -> Result<FileStore, StorageError> {
        FileStore::open(self.state_file())
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("MARKETPLACE_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MARKETPLACE_API_BASE_URL".to_string(), e.to_string())
        })?;

        let timeout = get_env_or_default("MARKETPLACE_API_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MARKETPLACE_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let cache_ttl = get_env_or_default("MARKETPLACE_CATALOG_CACHE_SECS", "300")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "MARKETPLACE_CATALOG_CACHE_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout),
            cache_ttl: Duration::from_secs(cache_ttl),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

//! API configuration module.
//!
//! Configuration is layered: built-in defaults, then an optional
//! `warung.toml` in the working directory, then `WARUNG_*` environment
//! variables (`WARUNG_PORT`, `WARUNG_DATABASE_URL`, ...).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use warung_core::DEFAULT_RESERVE_ACCOUNT;

const DEV_JWT_SECRET: &str = "warung-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Pool size; bounds the number of ledger operations in flight
    pub max_connections: u32,

    /// Secret key for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Account that receives capital adjustments and funds transfer sales
    pub reserve_account_name: String,

    /// Requests running longer than this are cancelled (and rolled back)
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// Load configuration from `warung.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name("warung").required(false))
            .add_source(config::Environment::with_prefix("WARUNG").try_parsing(true))
            .build()?;

        Self::from_settings(settings)
    }

    /// Builder pre-filled with every default value.
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(config::Config::builder()
            .set_default("port", 3000)?
            .set_default("database_url", "postgres://localhost:5432/warung")?
            .set_default("max_connections", 10)?
            .set_default("jwt_secret", DEV_JWT_SECRET)?
            .set_default("jwt_lifetime_secs", 8 * 3600)? // one shift
            .set_default("reserve_account_name", DEFAULT_RESERVE_ACCOUNT)?
            .set_default("request_timeout_secs", 30)?)
    }

    /// Deserializes and validates built settings.
    pub fn from_settings(settings: config::Config) -> Result<Self, ConfigError> {
        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;

        if config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("Using the development JWT secret, set WARUNG_JWT_SECRET in production");
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_url".to_string()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.reserve_account_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("reserve_account_name".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_lifetime_secs".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

/// Default maximum wallet balance, in the smallest currency unit.
/// 20_000_000 paise = 2 lakh INR.
const DEFAULT_MAX_BALANCE_LIMIT: i64 = 20_000_000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Ledger business settings
    pub ledger: LedgerSettings,
}

/// Business settings carried into the transfer engine.
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    /// Hard ceiling on any wallet balance, in the smallest currency unit
    pub max_balance_limit: i64,

    /// Currency code assigned to newly created wallets
    pub default_currency: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_balance_limit: DEFAULT_MAX_BALANCE_LIMIT,
            default_currency: "INR".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let max_balance_limit: i64 = env::var("MAX_BALANCE_LIMIT")
            .unwrap_or_else(|_| DEFAULT_MAX_BALANCE_LIMIT.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_BALANCE_LIMIT"))?;

        if max_balance_limit <= 0 {
            return Err(ConfigError::InvalidValue("MAX_BALANCE_LIMIT"));
        }

        let default_currency =
            env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "INR".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            ledger: LedgerSettings {
                max_balance_limit,
                default_currency,
            },
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ledger_settings() {
        let settings = LedgerSettings::default();
        assert_eq!(settings.max_balance_limit, 20_000_000);
        assert_eq!(settings.default_currency, "INR");
    }
}

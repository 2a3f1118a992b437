//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `WAVESHOP` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use waveshop::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod gateways;
mod server;
mod subscription;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateways::{CryptomusConfig, GatewaysConfig, TelegramStarsConfig, YookassaConfig};
pub use server::{Environment, ServerConfig};
pub use subscription::SubscriptionConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Subscription service client configuration
    pub subscription: SubscriptionConfig,

    /// Payment gateway sections
    #[serde(default)]
    pub gateways: GatewaysConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `WAVESHOP` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `WAVESHOP__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WAVESHOP__GATEWAYS__YOOKASSA__SHOP_ID=...` -> `gateways.yookassa.shop_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WAVESHOP")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.subscription.validate()?;
        self.gateways.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription() -> SubscriptionConfig {
        SubscriptionConfig {
            service_url: "http://subscription.internal:8081".into(),
            api_token: None,
            timeout_secs: 10,
        }
    }

    #[test]
    fn default_sections_validate_without_gateways() {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/waveshop".into(),
                ..Default::default()
            },
            subscription: subscription(),
            gateways: GatewaysConfig::default(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_section_fails_the_whole_config() {
        let config = AppConfig {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            database: DatabaseConfig {
                url: "postgres://localhost/waveshop".into(),
                ..Default::default()
            },
            subscription: subscription(),
            gateways: GatewaysConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}

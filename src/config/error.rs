//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Gateway return URL must be an absolute http(s) URL")]
    InvalidReturnUrl,

    #[error("Service URL must be an absolute http(s) URL")]
    InvalidServiceUrl,

    #[error("Invalid trusted network '{0}': expected CIDR notation")]
    InvalidTrustedNetwork(String),

    #[error("Pending transaction TTL must be positive")]
    InvalidPendingTtl,

    #[error("Enabled gateway '{0}' has webhooks that can never authenticate: set a webhook secret or allow_unsigned")]
    UnverifiableWebhooks(&'static str),
}

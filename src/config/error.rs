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

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid pool size: min {min}, max {max}")]
    InvalidPoolSize { min: u32, max: u32 },

    #[error("Invalid API base URL: {0}")]
    InvalidApiUrl(String),

    #[error("Timeout must be positive: {0}")]
    InvalidTimeout(&'static str),

    #[error("Outbound queue capacity must be positive")]
    InvalidQueueCapacity,
}

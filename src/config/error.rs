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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Transaction timeout must be between 1 and 60000 ms")]
    InvalidTransactionTimeout,

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(&'static str),

    #[error("Check-in bounds cannot be negative")]
    InvalidCheckInWindow,

    #[error("Tax rate cannot exceed 100%")]
    TaxRateTooHigh,

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}

//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `COWORK_BOOKING` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use cowork_booking::config::AppConfig;
//!
//! # fn main() -> Result<(), cowork_booking::config::ConfigError> {
//! let config = AppConfig::load()?;
//! config.validate()?;
//!
//! println!("Transactions time out after {:?}", config.booking.transaction_timeout());
//! # Ok(())
//! # }
//! ```

mod booking;
mod database;
mod error;
mod logging;

pub use booking::BookingConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{Environment, LoggingConfig};

use serde::Deserialize;

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection pool
    pub database: DatabaseConfig,

    /// Reservation and settlement tuning
    #[serde(default)]
    pub booking: BookingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `COWORK_BOOKING` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `COWORK_BOOKING__DATABASE__URL=...` -> `database.url`
    /// - `COWORK_BOOKING__BOOKING__MAX_RETRIES=5` -> `booking.max_retries`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COWORK_BOOKING")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.booking.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

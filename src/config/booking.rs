//! Reservation and settlement tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::foundation::Currency;
use crate::domain::reservation::CheckInPolicy;

/// Knobs for the reservation core.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Time budget for one create-reservation or settlement attempt
    #[serde(default = "default_transaction_timeout_ms")]
    pub transaction_timeout_ms: u64,

    /// Retries after the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,

    /// Minutes before the start at which check-in opens
    #[serde(default = "default_check_in_early_minutes")]
    pub check_in_early_minutes: i64,

    /// Minutes after the end during which check-in stays open
    #[serde(default)]
    pub check_in_grace_minutes: i64,

    /// Invoice tax rate; 1000 = 10%
    #[serde(default = "default_tax_rate_basis_points")]
    pub tax_rate_basis_points: u32,

    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl BookingConfig {
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }

    pub fn retry_initial_delay(&self) -> Duration {
        Duration::from_millis(self.retry_initial_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry_max_delay_ms)
    }

    pub fn check_in_policy(&self) -> CheckInPolicy {
        CheckInPolicy::new(self.check_in_early_minutes, self.check_in_grace_minutes)
    }

    /// The configured default currency. Call [`validate`](Self::validate)
    /// first; an invalid code surfaces here as a validation error.
    pub fn currency(&self) -> Result<Currency, ValidationError> {
        Currency::new(self.default_currency.as_str())
            .map_err(|_| ValidationError::InvalidCurrency(self.default_currency.clone()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.transaction_timeout_ms == 0 || self.transaction_timeout_ms > 60_000 {
            return Err(ValidationError::InvalidTransactionTimeout);
        }
        if self.max_retries > 10 {
            return Err(ValidationError::InvalidRetryPolicy("max_retries cannot exceed 10"));
        }
        if self.retry_initial_delay_ms > self.retry_max_delay_ms {
            return Err(ValidationError::InvalidRetryPolicy(
                "initial delay exceeds max delay",
            ));
        }
        if self.retry_multiplier.is_nan() || self.retry_multiplier < 1.0 {
            return Err(ValidationError::InvalidRetryPolicy("multiplier must be at least 1.0"));
        }
        if self.check_in_early_minutes < 0 || self.check_in_grace_minutes < 0 {
            return Err(ValidationError::InvalidCheckInWindow);
        }
        if self.tax_rate_basis_points > 10_000 {
            return Err(ValidationError::TaxRateTooHigh);
        }
        self.currency()?;
        Ok(())
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            transaction_timeout_ms: default_transaction_timeout_ms(),
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            retry_multiplier: default_retry_multiplier(),
            check_in_early_minutes: default_check_in_early_minutes(),
            check_in_grace_minutes: 0,
            tax_rate_basis_points: default_tax_rate_basis_points(),
            default_currency: default_currency(),
        }
    }
}

fn default_transaction_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    25
}

fn default_retry_max_delay_ms() -> u64 {
    500
}

fn default_retry_multiplier() -> f64 {
    2.0
}

fn default_check_in_early_minutes() -> i64 {
    15
}

fn default_tax_rate_basis_points() -> u32 {
    1000
}

fn default_currency() -> String {
    "USD".to_string()
}

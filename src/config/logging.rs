//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Deployment environment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive, e.g. `info,cowork_booking=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON lines instead of the pretty formatter.
    /// Production always logs JSON.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn use_json(&self) -> bool {
        self.json || self.is_production()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_level.trim().is_empty() {
            return Err(ValidationError::InvalidLogFilter("empty filter".to_string()));
        }
        tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidLogFilter(e.to_string()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info,cowork_booking=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_to_pretty_output() {
        let config = LoggingConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.use_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_forces_json() {
        let config = LoggingConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(config.use_json());
    }

    #[test]
    fn blank_filter_is_rejected() {
        let config = LoggingConfig {
            log_level: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLogFilter(_))
        ));
    }
}

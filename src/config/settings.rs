//! # Configuration Settings
//!
//! Defines the provider and logging configuration.

use crate::errors::{Error, Result};
use crate::esc::{EnvironmentRef, DEFAULT_API_URL};
use crate::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Connection settings for one ESC environment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EscProviderConfig {
    /// ESC API base URL
    #[validate(url(message = "API URL must be a valid URL"))]
    pub api_url: String,

    /// Organization owning the environment
    #[validate(length(min = 1, message = "Organization cannot be empty"))]
    pub organization: String,

    /// Environment name
    #[validate(length(min = 1, message = "Environment cannot be empty"))]
    pub environment: String,

    /// Access token sent as `Authorization: token <value>`
    pub access_token: SecretString,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for EscProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            organization: String::new(),
            environment: String::new(),
            access_token: SecretString::default(),
            timeout_seconds: 30,
        }
    }
}

impl EscProviderConfig {
    /// Create a configuration for `organization/environment` with default API settings.
    pub fn new(
        organization: impl Into<String>,
        environment: impl Into<String>,
        access_token: impl Into<SecretString>,
    ) -> Self {
        Self {
            organization: organization.into(),
            environment: environment.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `ESC_ORGANIZATION`, `ESC_ENVIRONMENT`: required
    /// - `ESC_ACCESS_TOKEN`: required, falls back to `PULUMI_ACCESS_TOKEN`
    /// - `ESC_API_URL`: defaults to [`DEFAULT_API_URL`]
    /// - `ESC_TIMEOUT_SECONDS`: defaults to 30
    pub fn from_env() -> Result<Self> {
        let organization = std::env::var("ESC_ORGANIZATION")
            .map_err(|_| Error::config("ESC_ORGANIZATION environment variable not set"))?;

        let environment = std::env::var("ESC_ENVIRONMENT")
            .map_err(|_| Error::config("ESC_ENVIRONMENT environment variable not set"))?;

        let access_token = std::env::var("ESC_ACCESS_TOKEN")
            .or_else(|_| std::env::var("PULUMI_ACCESS_TOKEN"))
            .map_err(|_| {
                Error::config("ESC_ACCESS_TOKEN or PULUMI_ACCESS_TOKEN environment variable not set")
            })?;

        let api_url = std::env::var("ESC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_seconds = match std::env::var("ESC_TIMEOUT_SECONDS") {
            Ok(value) => value
                .parse()
                .map_err(|e| Error::config(format!("Invalid ESC_TIMEOUT_SECONDS '{}': {}", value, e)))?,
            Err(_) => 30,
        };

        Ok(Self {
            api_url,
            organization,
            environment,
            access_token: SecretString::new(access_token),
            timeout_seconds,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Checks the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        if !self.api_url.starts_with("https://") && !self.api_url.starts_with("http://") {
            return Err(Error::validation_field(
                "API URL must start with 'http://' or 'https://'",
                "api_url",
            ));
        }

        if self.access_token.is_empty() {
            return Err(Error::validation_field("Access token cannot be empty", "access_token"));
        }

        Ok(())
    }

    /// The environment this configuration points at
    pub fn environment_ref(&self) -> EnvironmentRef {
        EnvironmentRef::new(&self.organization, &self.environment)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Emit JSON formatted logs
    pub json_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

impl LoggingConfig {
    /// Load logging settings from `ESC_LOG_LEVEL` and `ESC_LOG_FORMAT` (`json` enables JSON output).
    pub fn from_env() -> Self {
        let log_level = std::env::var("ESC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json_logging = std::env::var("ESC_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self { log_level, json_logging }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::validation_field(
                format!("Log level must be one of: {}", valid_levels.join(", ")),
                "log_level",
            ));
        }

        Ok(())
    }
}

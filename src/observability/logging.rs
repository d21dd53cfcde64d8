//! # Structured Logging
//!
//! Span macros for provider operations and subscriber setup.
//!
//! Spans and events carry keys, counts and environment names. Secret values are never recorded.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{EscProviderConfig, LoggingConfig};
use crate::errors::{Error, Result};

/// Create a tracing span for a secrets operation against one environment.
///
/// ```rust,ignore
/// let span = secrets_span!("get_secret", &environment);
/// let span = secrets_span!("push_secret", &environment, remote_key = %key);
/// ```
#[macro_export]
macro_rules! secrets_span {
    ($operation:expr, $environment:expr) => {
        tracing::info_span!(
            "secrets_operation",
            operation = %$operation,
            organization = %$environment.organization,
            environment = %$environment.environment,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $environment:expr, $($field:tt)*) => {
        tracing::info_span!(
            "secrets_operation",
            operation = %$operation,
            organization = %$environment.organization,
            environment = %$environment.environment,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global subscriber is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))
}

/// Log provider configuration at startup
pub fn log_provider_config(config: &EscProviderConfig) {
    tracing::info!(
        api_url = %config.api_url,
        organization = %config.organization,
        environment = %config.environment,
        timeout_seconds = config.timeout_seconds,
        token_configured = !config.access_token.is_empty(),
        "ESC secrets provider configuration"
    );
}

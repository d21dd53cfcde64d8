//! Integration tests for configuration management
//!
//! These tests validate that provider and logging settings are read from environment variables
//! and that invalid settings are rejected before a provider is built.

use esc_secrets::config::{EscProviderConfig, LoggingConfig};
use esc_secrets::esc::{EnvironmentRef, DEFAULT_API_URL};
use esc_secrets::secrets::EscSecretsClient;
use esc_secrets::{Error, Result};
use std::env;
use std::sync::Mutex;
use std::time::Duration;

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "ESC_API_URL",
    "ESC_ORGANIZATION",
    "ESC_ENVIRONMENT",
    "ESC_ACCESS_TOKEN",
    "PULUMI_ACCESS_TOKEN",
    "ESC_TIMEOUT_SECONDS",
    "ESC_LOG_LEVEL",
    "ESC_LOG_FORMAT",
];

/// Run `f` with the given variables set and every other provider variable cleared.
fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let original: Vec<(&str, Option<String>)> =
        VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
    for name in VARS {
        env::remove_var(name);
    }
    for (name, value) in vars {
        env::set_var(name, value);
    }

    let result = f();

    for (name, value) in original {
        match value {
            Some(value) => env::set_var(name, value),
            None => env::remove_var(name),
        }
    }
    result
}

#[test]
fn test_provider_config_from_env() -> Result<()> {
    let config = with_env(
        &[
            ("ESC_ORGANIZATION", "acme"),
            ("ESC_ENVIRONMENT", "payments-prod"),
            ("ESC_ACCESS_TOKEN", "pul-abc"),
            ("ESC_API_URL", "https://esc.internal.example.com/api/esc"),
            ("ESC_TIMEOUT_SECONDS", "12"),
        ],
        EscProviderConfig::from_env,
    )?;

    assert_eq!(config.environment_ref(), EnvironmentRef::new("acme", "payments-prod"));
    assert_eq!(config.access_token.expose_secret(), "pul-abc");
    assert_eq!(config.api_url, "https://esc.internal.example.com/api/esc");
    assert_eq!(config.timeout(), Duration::from_secs(12));
    config.validate()?;

    Ok(())
}

#[test]
fn test_provider_config_defaults_and_token_fallback() -> Result<()> {
    let config = with_env(
        &[
            ("ESC_ORGANIZATION", "acme"),
            ("ESC_ENVIRONMENT", "dev"),
            ("PULUMI_ACCESS_TOKEN", "pul-fallback"),
        ],
        EscProviderConfig::from_env,
    )?;

    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.access_token.expose_secret(), "pul-fallback");

    Ok(())
}

#[test]
fn test_provider_config_missing_values() {
    let result = with_env(&[("ESC_ENVIRONMENT", "dev"), ("ESC_ACCESS_TOKEN", "t")], || {
        EscProviderConfig::from_env()
    });
    assert!(matches!(result, Err(Error::Config(message)) if message.contains("ESC_ORGANIZATION")));

    let result = with_env(&[("ESC_ORGANIZATION", "acme"), ("ESC_ENVIRONMENT", "dev")], || {
        EscProviderConfig::from_env()
    });
    assert!(matches!(result, Err(Error::Config(message)) if message.contains("ACCESS_TOKEN")));
}

#[test]
fn test_provider_config_invalid_timeout() {
    let result = with_env(
        &[
            ("ESC_ORGANIZATION", "acme"),
            ("ESC_ENVIRONMENT", "dev"),
            ("ESC_ACCESS_TOKEN", "t"),
            ("ESC_TIMEOUT_SECONDS", "soon"),
        ],
        EscProviderConfig::from_env,
    );
    assert!(result.is_err());

    let config = with_env(
        &[
            ("ESC_ORGANIZATION", "acme"),
            ("ESC_ENVIRONMENT", "dev"),
            ("ESC_ACCESS_TOKEN", "t"),
            ("ESC_TIMEOUT_SECONDS", "900"),
        ],
        EscProviderConfig::from_env,
    )
    .unwrap();
    assert!(matches!(config.validate(), Err(Error::Validation { .. })));
}

#[test]
fn test_provider_rejects_invalid_config() {
    let mut config = EscProviderConfig::new("acme", "dev", "t");
    config.api_url = "not a url".to_string();

    let err = EscSecretsClient::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("api_url"));

    let config = EscProviderConfig::new("acme", "", "t");
    assert!(EscSecretsClient::from_config(&config).is_err());
}

#[test]
fn test_logging_config_from_env() {
    let config =
        with_env(&[("ESC_LOG_LEVEL", "debug"), ("ESC_LOG_FORMAT", "JSON")], LoggingConfig::from_env);
    assert_eq!(config.log_level, "debug");
    assert!(config.json_logging);
    assert!(config.validate().is_ok());

    let config = with_env(&[], LoggingConfig::from_env);
    assert_eq!(config.log_level, "info");
    assert!(!config.json_logging);
}

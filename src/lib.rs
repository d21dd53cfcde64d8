//! # esc-secrets
//!
//! A secrets provider that reads and writes key/value secrets stored in ESC configuration
//! environments.
//!
//! ## Architecture
//!
//! ```text
//! SecretsClient (controller contract)
//!        ↓
//! EscSecretsClient ── value coercion / dotted-key merge
//!        ↓
//! EnvironmentApi ── HttpEnvironmentApi | InMemoryEnvironmentApi
//! ```
//!
//! ## Core Components
//!
//! - **Secret Adapter** ([`secrets::EscSecretsClient`]): implements the controller contract
//! - **Value Coercion** ([`esc::value`]): turns dynamically typed property values into bytes
//! - **Merge Engine** ([`esc::merge`]): expands dotted keys and deep-merges environment documents
//! - **ESC API** ([`esc::api`]): the remote read/update surface and its HTTP implementation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use esc_secrets::config::{EscProviderConfig, LoggingConfig};
//! use esc_secrets::secrets::{EscSecretsClient, RemoteRef, SecretsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     esc_secrets::observability::init_logging(&LoggingConfig::from_env())?;
//!
//!     let config = EscProviderConfig::from_env()?;
//!     let client = EscSecretsClient::from_config(&config)?;
//!     let password = client.get_secret(&RemoteRef::new("db.password")).await?;
//!     println!("read {} bytes", password.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod esc;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::{EscProviderConfig, LoggingConfig};
pub use errors::{Error, Result};
pub use secrets::{EscSecretsClient, SecretsClient, SecretsError};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

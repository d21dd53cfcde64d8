//! # Configuration Management
//!
//! Provider and logging settings, loaded from environment variables and validated with the
//! `validator` crate before use.

pub mod settings;

pub use settings::{EscProviderConfig, LoggingConfig};

//! # Observability Infrastructure
//!
//! Structured logging for the secrets provider: the global subscriber and span macros.

pub mod logging;

pub use logging::{init_logging, log_provider_config};

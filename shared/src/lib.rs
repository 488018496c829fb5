//! Shared configuration and logging for the push token services
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration types (environment, logging, provider token settings)
//! - Tracing subscriber bootstrap

pub mod config;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, Environment, LogFormat, LoggingConfig, ProviderTokenConfig,
};
pub use logging::init_tracing;

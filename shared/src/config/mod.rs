//! Configuration module
//!
//! - `environment` - Environment detection and logging configuration
//! - `provider` - Push provider token signing configuration

pub mod environment;
pub mod provider;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use environment::{Environment, LogFormat, LoggingConfig};
pub use provider::ProviderTokenConfig;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Provider token configuration
    pub provider_token: ProviderTokenConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            provider_token: ProviderTokenConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            provider_token: ProviderTokenConfig::default().with_sweep_interval(300),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Build configuration from the process environment (and `.env`, if present)
    ///
    /// The deployment environment picks the profile; `PUSH_*` variables then
    /// override the provider token settings.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = Environment::from_env();
        let base = match env {
            Environment::Production => Self::production(),
            _ => Self::development(),
        };
        Self {
            environment: env,
            provider_token: base.provider_token.with_env_overrides(),
            logging: LoggingConfig::for_environment(env),
        }
    }

    /// Load configuration from a TOML file layered with `PUSH__` environment overrides
    ///
    /// A missing file is not an error; the defaults and the environment still apply.
    /// Nested keys use `__` as separator, e.g. `PUSH__PROVIDER_TOKEN__KEY_ID`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(
                ::config::Environment::with_prefix("PUSH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<Self>()?)
    }
}

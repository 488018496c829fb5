//! Push provider token configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ConfigError;

/// Settings for signing provider authentication tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderTokenConfig {
    /// Path to the PKCS#8 PEM private key (`.p8` file)
    pub key_path: PathBuf,

    /// Key identifier placed in the token header (`kid`)
    pub key_id: String,

    /// Team identifier placed in the token claims (`iss`)
    pub team_id: String,

    /// How often the background sweep refreshes expired tokens, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Whether the background sweep runs at all
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

impl Default for ProviderTokenConfig {
    fn default() -> Self {
        Self {
            key_path: PathBuf::from("keys/AuthKey.p8"),
            key_id: String::new(),
            team_id: String::new(),
            sweep_interval_seconds: default_sweep_interval(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

impl ProviderTokenConfig {
    /// Create a configuration for the given key file and identifiers
    pub fn new(
        key_path: impl Into<PathBuf>,
        key_id: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Self {
        Self {
            key_path: key_path.into(),
            key_id: key_id.into(),
            team_id: team_id.into(),
            ..Default::default()
        }
    }

    /// Set the sweep interval in seconds
    pub fn with_sweep_interval(mut self, seconds: u64) -> Self {
        self.sweep_interval_seconds = seconds;
        self
    }

    /// Read the `PUSH_*` variables on top of the defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Replace each field whose `PUSH_*` variable is set.
    ///
    /// Unset variables, and numeric or boolean values that fail to parse,
    /// keep the current value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = env_value("PUSH_AUTH_KEY_PATH") {
            self.key_path = PathBuf::from(path);
        }
        if let Some(key_id) = env_value("PUSH_KEY_ID") {
            self.key_id = key_id;
        }
        if let Some(team_id) = env_value("PUSH_TEAM_ID") {
            self.team_id = team_id;
        }
        if let Some(seconds) =
            env_value("PUSH_SWEEP_INTERVAL_SECONDS").and_then(|value| value.parse::<u64>().ok())
        {
            self.sweep_interval_seconds = seconds;
        }
        if let Some(enabled) =
            env_value("PUSH_SWEEP_ENABLED").and_then(|value| value.parse::<bool>().ok())
        {
            self.sweep_enabled = enabled;
        }
        self
    }

    /// Check that every field needed to sign a token is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "key_path" });
        }
        if self.key_id.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "key_id" });
        }
        if self.team_id.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "team_id" });
        }
        if self.sweep_enabled && self.sweep_interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "sweep_interval_seconds must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|value| value.trim().to_string())
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_sweep_enabled() -> bool {
    true
}

//! Background sweep that keeps every registered provider token fresh
//!
//! Lookups already refresh on read; the sweep moves signing off the request
//! path by refreshing expired credentials at a fixed interval.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use pt_shared::ProviderTokenConfig;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::registry::CredentialRegistry;
use crate::errors::TokenError;

/// Configuration for the refresh sweep
#[derive(Debug, Clone)]
pub struct RefreshSweeperConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable the background sweep
    pub enabled: bool,
}

impl Default for RefreshSweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            enabled: true,
        }
    }
}

impl From<&ProviderTokenConfig> for RefreshSweeperConfig {
    fn from(config: &ProviderTokenConfig) -> Self {
        Self {
            interval_seconds: config.sweep_interval_seconds,
            enabled: config.sweep_enabled,
        }
    }
}

/// Periodically refreshes the expired credentials of a shared registry
pub struct RefreshSweeper<K> {
    registry: Arc<CredentialRegistry<K>>,
    config: RefreshSweeperConfig,
}

impl<K> RefreshSweeper<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(registry: Arc<CredentialRegistry<K>>, config: RefreshSweeperConfig) -> Self {
        Self { registry, config }
    }

    /// Run a single sweep over the registry
    ///
    /// A failing credential aborts the sweep; the failure is reported in the
    /// result rather than returned, so the background loop keeps running.
    pub fn run_sweep(&self) -> SweepResult {
        if !self.config.enabled {
            return SweepResult::default();
        }

        match self.registry.refresh_all_expired() {
            Ok(refreshed) => {
                if refreshed > 0 {
                    info!("Refreshed {} expired provider tokens", refreshed);
                }
                SweepResult {
                    refreshed,
                    error: None,
                }
            }
            Err(e) => {
                let refreshed = match &e {
                    TokenError::RefreshFailed { refreshed, .. } => *refreshed,
                    _ => 0,
                };
                warn!(refreshed, error = %e, "Provider token sweep stopped early");
                SweepResult {
                    refreshed,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Start the sweep as a background task
    ///
    /// This spawns a tokio task that runs a sweep at regular intervals,
    /// starting immediately. Returns `None` when the sweep is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Provider token refresh sweep is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Provider token refresh sweep started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                let result = self.run_sweep();
                if let Some(e) = result.error {
                    error!("Provider token sweep cycle failed: {}", e);
                }
            }
        }))
    }
}

/// Result of a sweep
#[derive(Debug, Default)]
pub struct SweepResult {
    /// Number of credentials signed again
    pub refreshed: usize,
    /// First refresh failure, if the sweep stopped early
    pub error: Option<String>,
}

impl SweepResult {
    /// Check if the sweep visited every credential without error
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

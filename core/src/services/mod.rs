//! Business services built on the domain layer.

pub mod token;

// Re-export commonly used types
pub use token::{CredentialRegistry, RefreshSweeper, RefreshSweeperConfig, SweepResult};

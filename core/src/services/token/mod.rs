//! Provider token services
//!
//! - Concurrent credential registry with refresh-on-read
//! - Background sweep refreshing expired credentials

mod registry;
mod sweeper;


pub use registry::CredentialRegistry;
pub use sweeper::{RefreshSweeper, RefreshSweeperConfig, SweepResult};

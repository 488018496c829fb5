//! # Push Token Core
//!
//! Provider authentication tokens for a push notification service.
//!
//! A [`Credential`] holds one ES256 signing identity and its current signed
//! token; a [`CredentialRegistry`] maps caller-defined keys to credentials
//! and refreshes expired tokens on lookup, so callers never receive a stale
//! token.
//!
//! ```no_run
//! use pt_core::{Credential, CredentialRegistry};
//!
//! let registry = CredentialRegistry::new();
//! let credential = Credential::from_key_file("keys/AuthKey_ABC123DEFG.p8", "ABC123DEFG", "DEF123GHIJ")
//!     .expect("auth key should load");
//! registry.insert("tenant-a".to_string(), credential);
//!
//! if let Some(credential) = registry.lookup("tenant-a") {
//!     let authorization = credential.authorization_header();
//! }
//! ```

pub mod domain;
pub mod errors;
pub mod services;

#[cfg(test)]
mod test_support;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;

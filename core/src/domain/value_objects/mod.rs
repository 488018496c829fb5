//! Value objects representing immutable domain concepts.

pub mod auth_key;

pub use auth_key::AuthKey;

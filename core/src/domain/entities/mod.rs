//! Domain entities representing core business objects.

pub mod credential;


pub use credential::{Credential, ProviderClaims, TOKEN_TIMEOUT_SECONDS};

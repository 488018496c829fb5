//! Token and key error types
//!
//! Covers the whole provider token lifecycle: loading the private key,
//! signing a token, and refreshing cached credentials.

use std::path::PathBuf;

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Auth key must be a valid PEM encoded PKCS#8 file")]
    NotPemEncoded,

    #[error("Auth key must be an ECDSA P-256 private key")]
    WrongKeyType,

    #[error("Invalid auth key: {message}")]
    KeyDecode { message: String },

    #[error("Failed to read auth key {}: {message}", path.display())]
    KeyRead { path: PathBuf, message: String },

    #[error("Auth key was not set")]
    MissingKey,

    #[error("Token signing failed: {message}")]
    Signing { message: String },

    #[error("{key} - {source}")]
    RefreshFailed {
        key: String,
        /// Credentials already signed again before the failing key was reached
        refreshed: usize,
        #[source]
        source: Box<TokenError>,
    },
}

impl TokenError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::NotPemEncoded => "NOT_PEM_ENCODED",
            TokenError::WrongKeyType => "WRONG_KEY_TYPE",
            TokenError::KeyDecode { .. } => "KEY_DECODE",
            TokenError::KeyRead { .. } => "KEY_READ",
            TokenError::MissingKey => "MISSING_KEY",
            TokenError::Signing { .. } => "SIGNING_FAILED",
            TokenError::RefreshFailed { .. } => "REFRESH_FAILED",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        TokenError::Signing {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_failed_names_key() {
        let error = TokenError::RefreshFailed {
            key: "tenant-a".to_string(),
            refreshed: 2,
            source: Box::new(TokenError::MissingKey),
        };
        let message = error.to_string();
        assert!(message.contains("tenant-a"));
        assert!(message.contains("Auth key was not set"));
        assert_eq!(error.code(), "REFRESH_FAILED");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TokenError::NotPemEncoded.code(), "NOT_PEM_ENCODED");
        assert_eq!(TokenError::WrongKeyType.code(), "WRONG_KEY_TYPE");
        assert_eq!(TokenError::MissingKey.code(), "MISSING_KEY");
    }
}

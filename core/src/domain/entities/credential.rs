//! Provider authentication credential: one signing identity and its current token.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, Header};
use pt_shared::ProviderTokenConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::value_objects::AuthKey;
use crate::errors::{DomainResult, TokenError};

/// Period in seconds a provider token is reused before it is signed again.
///
/// The push service rejects tokens issued more than an hour ago; regenerating
/// after 50 minutes leaves room for clock skew.
pub const TOKEN_TIMEOUT_SECONDS: i64 = 3000;

/// Claims carried by a provider token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderClaims {
    /// Issuer (team identifier)
    pub iss: String,

    /// Issued at timestamp
    pub iat: i64,
}

#[derive(Debug, Default)]
struct SignedState {
    issued_at: i64,
    bearer: Option<String>,
}

impl SignedState {
    fn is_expired_at(&self, now: i64) -> bool {
        now - self.issued_at >= TOKEN_TIMEOUT_SECONDS
    }
}

/// A signing identity plus its most recently signed provider token.
///
/// `issued_at` and the token are guarded by one lock and always replaced
/// together, so readers never see a token paired with another token's
/// timestamp.
pub struct Credential {
    signing_key: Option<AuthKey>,
    key_id: String,
    team_id: String,
    state: Mutex<SignedState>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("team_id", &self.team_id)
            .field("issued_at", &self.issued_at())
            .field("has_signing_key", &self.has_signing_key())
            .finish()
    }
}

impl Credential {
    /// Creates a credential that has not been signed yet (and is therefore expired)
    pub fn new(signing_key: AuthKey, key_id: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            signing_key: Some(signing_key),
            key_id: key_id.into(),
            team_id: team_id.into(),
            state: Mutex::new(SignedState::default()),
        }
    }

    /// Creates a credential with no signing key; every sign attempt fails with
    /// [`TokenError::MissingKey`]
    pub fn without_key(key_id: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            signing_key: None,
            key_id: key_id.into(),
            team_id: team_id.into(),
            state: Mutex::new(SignedState::default()),
        }
    }

    /// Loads the `.p8` key at `path` and builds a credential around it
    pub fn from_key_file<P: AsRef<Path>>(
        path: P,
        key_id: impl Into<String>,
        team_id: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let signing_key = AuthKey::from_file(path)?;
        Ok(Self::new(signing_key, key_id, team_id))
    }

    /// Validates provider token configuration and builds a credential from it
    pub fn from_config(config: &ProviderTokenConfig) -> DomainResult<Self> {
        config.validate()?;
        let credential =
            Self::from_key_file(&config.key_path, config.key_id.clone(), config.team_id.clone())?;
        Ok(credential)
    }

    /// Key identifier placed in the token header
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Team identifier placed in the token claims
    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn has_signing_key(&self) -> bool {
        self.signing_key.is_some()
    }

    /// Timestamp (seconds) of the last successful signing, `0` if never signed
    pub fn issued_at(&self) -> i64 {
        self.state().issued_at
    }

    /// The current signed token, if one has been generated
    pub fn bearer(&self) -> Option<String> {
        self.state().bearer.clone()
    }

    /// Value for the `authorization` request header, e.g. `bearer eyJhbGciOi...`
    pub fn authorization_header(&self) -> Option<String> {
        self.bearer().map(|token| format!("bearer {}", token))
    }

    /// Checks whether the token is older than [`TOKEN_TIMEOUT_SECONDS`]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Checks expiry against an explicit `now` timestamp in seconds
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.state().is_expired_at(now)
    }

    /// Signs a new token if the current one has expired.
    ///
    /// The expiry check and the signing happen under this credential's lock, so
    /// concurrent callers sign at most once per timeout window.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A new token was signed
    /// * `Ok(false)` - The current token is still valid
    /// * `Err(TokenError)` - Signing failed; the previous state is kept
    pub fn refresh_if_expired(&self) -> Result<bool, TokenError> {
        let mut state = self.state();
        if state.is_expired_at(Utc::now().timestamp()) {
            return self.sign_into(&mut state);
        }
        Ok(false)
    }

    /// Signs a new token unconditionally.
    ///
    /// Advanced use only: this skips the expiry check, so every call produces
    /// a new token. Prefer [`Credential::refresh_if_expired`].
    pub fn sign(&self) -> Result<bool, TokenError> {
        let mut state = self.state();
        self.sign_into(&mut state)
    }

    fn sign_into(&self, state: &mut SignedState) -> Result<bool, TokenError> {
        let signing_key = self.signing_key.as_ref().ok_or(TokenError::MissingKey)?;

        let issued_at = Utc::now().timestamp();
        let mut header = Header::new(Algorithm::ES256);
        header.typ = None;
        header.kid = Some(self.key_id.clone());
        let claims = ProviderClaims {
            iss: self.team_id.clone(),
            iat: issued_at,
        };

        let bearer = encode(&header, &claims, signing_key.encoding_key())?;

        state.issued_at = issued_at;
        state.bearer = Some(bearer);
        debug!(key_id = %self.key_id, issued_at, "Signed provider token");
        Ok(true)
    }

    fn state(&self) -> MutexGuard<'_, SignedState> {
        // The state is always replaced as a whole, so a poisoned lock still holds a consistent pair.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn set_issued_at(&self, issued_at: i64) {
        self.state().issued_at = issued_at;
    }
}

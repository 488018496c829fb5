//! Concurrent registry of provider credentials with refresh-on-read.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::entities::Credential;
use crate::errors::TokenError;

/// Keyed store of [`Credential`]s that never hands out an expired token.
///
/// Keys are caller-defined identities such as a tenant name. The registry
/// lock is always taken before a credential's own lock, never the other way
/// around.
///
/// `lookup` keeps the registry lock while it refreshes the credential, so
/// lookups on unrelated keys are serialized behind any in-flight signing.
pub struct CredentialRegistry<K> {
    entries: Mutex<HashMap<K, Arc<Credential>>>,
}

impl<K> Default for CredentialRegistry<K> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> fmt::Debug for CredentialRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRegistry")
            .field("len", &self.entries().len())
            .finish()
    }
}

impl<K> CredentialRegistry<K> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<K, Arc<Credential>>> {
        // Map operations are single calls, so a panic elsewhere cannot leave it half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K> CredentialRegistry<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Returns true if a credential is registered under `key`
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries().contains_key(key)
    }

    /// Returns the credential for `key`, signing a new token first if the
    /// current one has expired.
    ///
    /// A credential that fails to refresh is evicted and `None` is returned;
    /// the caller must insert a corrected credential to use the key again.
    pub fn lookup<Q>(&self, key: &Q) -> Option<Arc<Credential>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        let mut entries = self.entries();
        let credential = Arc::clone(entries.get(key)?);

        match credential.refresh_if_expired() {
            Ok(refreshed) => {
                if refreshed {
                    debug!(key = ?key, key_id = %credential.key_id(), "Refreshed provider token on lookup");
                }
                Some(credential)
            }
            Err(e) => {
                warn!(key = ?key, key_id = %credential.key_id(), error = %e, "Evicting credential that failed to refresh");
                entries.remove(key);
                None
            }
        }
    }

    /// Stores `credential` under `key`, returning the credential it replaced
    pub fn insert(
        &self,
        key: K,
        credential: impl Into<Arc<Credential>>,
    ) -> Option<Arc<Credential>> {
        self.entries().insert(key, credential.into())
    }

    /// Removes the credential registered under `key`, if any
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<Credential>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries().remove(key)
    }

    /// Snapshot of the registered keys, in no particular order
    pub fn keys(&self) -> Vec<K> {
        self.entries().keys().cloned().collect()
    }

    /// Refreshes every expired credential.
    ///
    /// Stops at the first credential that fails to refresh and returns
    /// [`TokenError::RefreshFailed`] naming its key; credentials not yet
    /// visited are left as they are. Iteration order is unspecified.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of credentials that were signed again
    /// * `Err(TokenError::RefreshFailed)` - The first failing key, its cause, and
    ///   how many credentials were signed before it
    pub fn refresh_all_expired(&self) -> Result<usize, TokenError> {
        let entries = self.entries();
        let mut refreshed = 0;

        for (key, credential) in entries.iter() {
            match credential.refresh_if_expired() {
                Ok(true) => refreshed += 1,
                Ok(false) => {}
                Err(e) => {
                    return Err(TokenError::RefreshFailed {
                        key: format!("{:?}", key),
                        refreshed,
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(refreshed)
    }
}

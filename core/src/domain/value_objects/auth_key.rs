//! ES256 auth key loading for provider token signing

use std::fs;
use std::path::Path;

use jsonwebtoken::EncodingKey;
use p256::pkcs8::{
    DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding, ObjectIdentifier,
    PrivateKeyInfo, SecretDocument,
};

use crate::errors::TokenError;

/// `id-ecPublicKey` algorithm identifier
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// `prime256v1` (NIST P-256) named curve
const PRIME256V1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// A P-256 private key ready to sign ES256 provider tokens.
///
/// The key material is read-only once loaded; clones share nothing mutable.
#[derive(Clone)]
pub struct AuthKey {
    /// Private key in the form `jsonwebtoken` signs with
    encoding_key: EncodingKey,
    /// Matching public key as SPKI PEM, for verifying issued tokens
    public_key_pem: String,
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthKey")
            .field("algorithm", &"ES256")
            .finish_non_exhaustive()
    }
}

impl AuthKey {
    /// Loads a `.p8` auth key from a local file
    ///
    /// # Returns
    ///
    /// * `Ok(AuthKey)` - Key loaded successfully
    /// * `Err(TokenError::KeyRead)` - The file could not be read
    /// * `Err(TokenError)` - Any error returned by [`AuthKey::from_pem`]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TokenError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| TokenError::KeyRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_pem(&bytes)
    }

    /// Loads an auth key from in-memory PEM bytes
    ///
    /// Only the first PEM block is read; text before or after it is ignored.
    /// Its body must be a PKCS#8 `PrivateKeyInfo` holding an EC key on the
    /// P-256 curve.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthKey)` - Key parsed successfully
    /// * `Err(TokenError::NotPemEncoded)` - Input is not PEM
    /// * `Err(TokenError::WrongKeyType)` - PKCS#8 key of another algorithm or curve
    /// * `Err(TokenError::KeyDecode)` - PEM body is not a valid PKCS#8 EC key
    pub fn from_pem(bytes: &[u8]) -> Result<Self, TokenError> {
        let pem = std::str::from_utf8(bytes).map_err(|_| TokenError::NotPemEncoded)?;
        let block = first_pem_block(pem).ok_or(TokenError::NotPemEncoded)?;
        let (_label, document) =
            SecretDocument::from_pem(block).map_err(|_| TokenError::NotPemEncoded)?;

        let info = PrivateKeyInfo::try_from(document.as_bytes()).map_err(|e| {
            TokenError::KeyDecode {
                message: e.to_string(),
            }
        })?;

        if info.algorithm.oid != EC_PUBLIC_KEY_OID {
            return Err(TokenError::WrongKeyType);
        }
        match info.algorithm.parameters_oid() {
            Ok(curve) if curve == PRIME256V1_OID => {}
            _ => return Err(TokenError::WrongKeyType),
        }

        let secret = p256::SecretKey::from_pkcs8_der(document.as_bytes()).map_err(|e| {
            TokenError::KeyDecode {
                message: e.to_string(),
            }
        })?;

        // Re-encode so the embedded public key is always present for the signer.
        let pkcs8 = secret.to_pkcs8_der().map_err(|e| TokenError::KeyDecode {
            message: e.to_string(),
        })?;
        let public_key_pem = secret
            .public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| TokenError::KeyDecode {
                message: e.to_string(),
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_ec_der(pkcs8.as_bytes()),
            public_key_pem,
        })
    }

    /// Returns the encoding key for signing tokens
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the public half of the key as SPKI PEM
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }
}

/// Slices out the first `-----BEGIN ...-----` to `-----END ...-----` block
fn first_pem_block(input: &str) -> Option<&str> {
    const BEGIN: &str = "-----BEGIN ";
    const END: &str = "-----END ";
    const DASHES: &str = "-----";

    let start = input.find(BEGIN)?;
    let end = start + input[start..].find(END)? + END.len();
    let close = end + input[end..].find(DASHES)? + DASHES.len();
    Some(&input[start..close])
}

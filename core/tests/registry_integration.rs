//! Integration tests for provider token credentials and the registry

use std::path::PathBuf;
use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use pt_core::{AuthKey, Credential, CredentialRegistry, ProviderClaims, TokenError};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_token_lifecycle_through_registry() {
    let key = AuthKey::from_file(fixture_path("AuthKey_P256TEST01.p8")).expect("Failed to load key");
    let credential = Credential::new(key.clone(), "P256TEST01", "TEAM000001");

    let registry = CredentialRegistry::new();
    registry.insert("tenant-a".to_string(), credential);

    let found = registry.lookup("tenant-a").expect("credential should be registered");
    let token = found.bearer().expect("lookup should sign the token");

    let header = decode_header(&token).expect("Failed to decode header");
    assert_eq!(header.alg, Algorithm::ES256);
    assert_eq!(header.kid.as_deref(), Some("P256TEST01"));
    assert!(header.typ.is_none());

    let decoding_key = DecodingKey::from_ec_pem(key.public_key_pem().as_bytes())
        .expect("Failed to parse public key");
    let mut validation = Validation::new(Algorithm::ES256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    let claims = decode::<ProviderClaims>(&token, &decoding_key, &validation)
        .expect("Failed to verify token")
        .claims;

    assert_eq!(claims.iss, "TEAM000001");
    assert_eq!(claims.iat, found.issued_at());

    // A second lookup inside the timeout window reuses the token.
    let again = registry.lookup("tenant-a").unwrap();
    assert!(Arc::ptr_eq(&found, &again));
    assert_eq!(again.bearer().as_deref(), Some(token.as_str()));
}

#[test]
fn test_failed_refresh_evicts_entry() {
    let registry = CredentialRegistry::new();
    registry.insert("tenant-b", Credential::without_key("KEY", "TEAM"));

    assert!(registry.lookup("tenant-b").is_none());
    assert!(!registry.contains("tenant-b"));
}

#[test]
fn test_refresh_all_expired_reports_failing_key() {
    let registry = CredentialRegistry::new();
    registry.insert("broken-tenant", Credential::without_key("KEY", "TEAM"));

    let error = registry.refresh_all_expired().unwrap_err();
    assert!(error.to_string().contains("broken-tenant"));
}

#[test]
fn test_key_file_with_trailing_note_loads() {
    let key = AuthKey::from_file(fixture_path("AuthKey_P256_with_note.p8"))
        .expect("Failed to load key with trailing text");
    let credential = Credential::new(key, "P256TEST01", "TEAM000001");
    assert!(credential.refresh_if_expired().unwrap());
}

#[test]
fn test_auth_key_module_path() {
    let key = pt_core::domain::value_objects::AuthKey::from_file(fixture_path(
        "AuthKey_P256TEST01.p8",
    ))
    .expect("Failed to load key");
    let reexported: AuthKey = key;
    assert!(reexported.public_key_pem().contains("BEGIN PUBLIC KEY"));
}

#[test]
fn test_key_loading_errors() {
    assert!(matches!(
        AuthKey::from_file(fixture_path("not_pem.txt")),
        Err(TokenError::NotPemEncoded)
    ));
    assert!(matches!(
        AuthKey::from_file(fixture_path("AuthKey_Ed25519.p8")),
        Err(TokenError::WrongKeyType)
    ));
    assert!(matches!(
        Credential::from_key_file(fixture_path("missing.p8"), "KEY", "TEAM"),
        Err(TokenError::KeyRead { .. })
    ));
}

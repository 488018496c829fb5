//! Fixtures shared by unit tests

use std::path::PathBuf;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Header, Validation};

use crate::domain::{AuthKey, ProviderClaims};

/// PKCS#8 PEM P-256 key used across the test suite
pub const P256_KEY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/AuthKey_P256TEST01.p8"
));

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).expect("fixture should exist")
}

pub fn test_key() -> AuthKey {
    AuthKey::from_pem(P256_KEY.as_bytes()).expect("test key should load")
}

/// Verifies `token` against the public half of `key` and returns its header and claims
pub fn verify_token(token: &str, key: &AuthKey) -> (Header, ProviderClaims) {
    let decoding_key = DecodingKey::from_ec_pem(key.public_key_pem().as_bytes())
        .expect("public key should parse");
    let mut validation = Validation::new(Algorithm::ES256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<ProviderClaims>(token, &decoding_key, &validation)
        .expect("token should verify");
    (data.header, data.claims)
}

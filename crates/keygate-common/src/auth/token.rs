//! Opaque token primitives
//!
//! All credentials issued by the service are random opaque strings, never
//! self-describing tokens. Access tokens are validated on every request, so
//! their stored form is a fast SHA-256 digest. Refresh tokens are long-lived
//! and redeemed rarely, so they get the same salted Argon2 treatment as
//! passwords.

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;

/// Length of an access token secret.
pub const ACCESS_TOKEN_LENGTH: usize = 60;

/// Length of a refresh token secret.
pub const REFRESH_TOKEN_LENGTH: usize = 64;

/// Length of a pending two-factor login handle.
pub const PENDING_HANDLE_LENGTH: usize = 80;

/// Digits in a two-factor verification code.
pub const TWO_FACTOR_CODE_DIGITS: usize = 6;

/// Generate a random alphanumeric secret of the given length.
///
/// Drawn from the OS entropy source.
#[must_use]
pub fn generate_secret(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate a pending two-factor login handle.
#[must_use]
pub fn generate_pending_handle() -> String {
    generate_secret(PENDING_HANDLE_LENGTH)
}

/// Generate a zero-padded numeric two-factor code.
#[must_use]
pub fn generate_numeric_code() -> String {
    let code: u32 = OsRng.gen_range(0..1_000_000);
    format!("{code:06}")
}

/// SHA-256 digest of a token secret as lowercase hex.
///
/// Used as the stored lookup key for access tokens.
#[must_use]
pub fn digest_token(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    format!("{digest:x}")
}

/// Hash a refresh token secret for storage.
///
/// Deliberately the same salted Argon2id primitive as passwords: a leaked
/// refresh-token table should be as useless as a leaked password table.
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_token_secret(secret: &str) -> Result<String, AppError> {
    hash_password(secret)
}

/// Verify a refresh token secret against a stored hash.
///
/// # Errors
/// Returns an error if the stored hash is malformed
pub fn verify_token_secret(secret: &str, hash: &str) -> Result<bool, AppError> {
    verify_password(secret, hash)
}

/// The credential pair returned by login, verification, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl TokenPair {
    /// Create a bearer token pair
    #[must_use]
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

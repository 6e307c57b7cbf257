//! Access token record - short-lived bearer credential
//!
//! Only the SHA-256 digest of the secret is ever persisted; the plaintext is
//! returned to the caller once at issuance and is not recoverable afterwards.

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// Persisted access token. `token_digest` is the lowercase hex SHA-256 of the
/// plaintext secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRecord {
    pub id: i64,
    pub user_id: UserId,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessTokenRecord {
    /// Check if the token is expired
    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if the token is still usable
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }
}

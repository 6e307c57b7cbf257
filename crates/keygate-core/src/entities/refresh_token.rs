//! Refresh token record - long-lived, single-use rotation credential
//!
//! The secret is stored as a salted argon2 hash, deliberately slower to check
//! than the access token digest: a stolen database dump must stay expensive
//! to brute-force. `used` and `revoked` are distinct flags: `used` marks a
//! redeemed token whose re-presentation is a replay signal, `revoked` marks a
//! token killed administratively (logout-all, password change, replay
//! fallout) whose presentation is merely invalid.

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// Persisted refresh token. `token_hash` is an argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub user_id: UserId,
    pub token_hash: String,
    pub used: bool,
    pub revoked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Check if the token is expired
    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if the token can still be redeemed
    #[inline]
    pub fn is_redeemable(&self) -> bool {
        !self.used && !self.revoked && !self.is_expired()
    }

    /// Check if presenting this token again would be a replay: it was
    /// redeemed, has not been administratively revoked, and is unexpired.
    #[inline]
    pub fn is_replay_candidate(&self) -> bool {
        self.used && !self.revoked && !self.is_expired()
    }
}

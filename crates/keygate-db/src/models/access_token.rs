//! Access token database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for access_tokens table
#[derive(Debug, Clone, FromRow)]
pub struct AccessTokenModel {
    pub id: i64,
    pub user_id: i64,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessTokenModel {
    /// Check if token is expired
    #[inline]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

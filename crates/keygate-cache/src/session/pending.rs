//! Pending two-factor login sessions in Redis.
//!
//! After a password check succeeds for a two-factor user, no tokens are
//! issued yet. Instead an opaque handle is bound to the user id here, with
//! a TTL, and handed to the client. Code request and code verification
//! resolve the handle back to the user; resolution never consumes it, so
//! the same handle survives a resend. Expiry is Redis's job alone.

use async_trait::async_trait;

use keygate_core::error::DomainError;
use keygate_core::traits::{PendingSessionStore, RepoResult};
use keygate_core::value_objects::UserId;

use crate::pool::{RedisPool, RedisPoolError};

/// Key prefix for pending two-factor sessions
const PENDING_SESSION_PREFIX: &str = "pending2fa:";

/// Redis-backed implementation of PendingSessionStore
#[derive(Clone)]
pub struct RedisPendingSessionStore {
    pool: RedisPool,
}

impl RedisPendingSessionStore {
    /// Create a new pending session store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Generate Redis key for a handle
    fn key(handle: &str) -> String {
        format!("{PENDING_SESSION_PREFIX}{handle}")
    }
}

fn map_cache_error(e: RedisPoolError) -> DomainError {
    DomainError::CacheError(e.to_string())
}

#[async_trait]
impl PendingSessionStore for RedisPendingSessionStore {
    async fn put(&self, handle: &str, user_id: UserId, ttl_seconds: u64) -> RepoResult<()> {
        let key = Self::key(handle);
        self.pool
            .set(&key, &user_id.into_inner(), Some(ttl_seconds))
            .await
            .map_err(map_cache_error)?;

        tracing::debug!(user_id = %user_id, ttl_seconds, "Stored pending two-factor session");

        Ok(())
    }

    async fn resolve(&self, handle: &str) -> RepoResult<Option<UserId>> {
        let key = Self::key(handle);
        let value: Option<i64> = self.pool.get_value(&key).await.map_err(map_cache_error)?;

        Ok(value.map(UserId::new))
    }
}

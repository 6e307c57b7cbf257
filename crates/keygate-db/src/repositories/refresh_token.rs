//! PostgreSQL implementation of RefreshTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use keygate_core::entities::RefreshTokenRecord;
use keygate_core::traits::{RefreshTokenRepository, RepoResult};
use keygate_core::value_objects::UserId;

use crate::models::RefreshTokenModel;

use super::error::map_db_error;

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new PgRefreshTokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    #[instrument(skip(self, token_hash))]
    async fn insert(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshTokenRecord> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, used, revoked, expires_at, created_at
            ",
        )
        .bind(user_id.into_inner())
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RefreshTokenRecord::from(result))
    }

    #[instrument(skip(self))]
    async fn list_redeemable(&self) -> RepoResult<Vec<RefreshTokenRecord>> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, user_id, token_hash, used, revoked, expires_at, created_at
            FROM refresh_tokens
            WHERE used = FALSE AND revoked = FALSE AND expires_at > NOW()
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(RefreshTokenRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_redeemed(&self) -> RepoResult<Vec<RefreshTokenRecord>> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, user_id, token_hash, used, revoked, expires_at, created_at
            FROM refresh_tokens
            WHERE used = TRUE AND revoked = FALSE AND expires_at > NOW()
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(RefreshTokenRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_used(&self, id: i64) -> RepoResult<bool> {
        // The guard in the WHERE clause makes concurrent redemptions of the
        // same token race to a single winner.
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET used = TRUE
            WHERE id = $1 AND used = FALSE AND revoked = FALSE
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND revoked = FALSE
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

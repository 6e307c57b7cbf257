//! PostgreSQL implementation of AccessTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use keygate_core::entities::AccessTokenRecord;
use keygate_core::traits::{AccessTokenRepository, RepoResult};
use keygate_core::value_objects::UserId;

use crate::models::AccessTokenModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AccessTokenRepository
#[derive(Clone)]
pub struct PgAccessTokenRepository {
    pool: PgPool,
}

impl PgAccessTokenRepository {
    /// Create a new PgAccessTokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessTokenRepository for PgAccessTokenRepository {
    #[instrument(skip(self, token_digest))]
    async fn insert(
        &self,
        user_id: UserId,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<AccessTokenRecord> {
        let result = sqlx::query_as::<_, AccessTokenModel>(
            r"
            INSERT INTO access_tokens (user_id, token_digest, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_digest, expires_at, created_at
            ",
        )
        .bind(user_id.into_inner())
        .bind(token_digest)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(AccessTokenRecord::from(result))
    }

    #[instrument(skip(self, token_digest))]
    async fn find_valid_by_digest(
        &self,
        token_digest: &str,
    ) -> RepoResult<Option<AccessTokenRecord>> {
        let result = sqlx::query_as::<_, AccessTokenModel>(
            r"
            SELECT id, user_id, token_digest, expires_at, created_at
            FROM access_tokens
            WHERE token_digest = $1 AND expires_at > NOW()
            ",
        )
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(AccessTokenRecord::from))
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<AccessTokenRecord>> {
        let result = sqlx::query_as::<_, AccessTokenModel>(
            r"
            SELECT id, user_id, token_digest, expires_at, created_at
            FROM access_tokens
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.into_iter().map(AccessTokenRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_for_user(&self, user_id: UserId) -> RepoResult<i64> {
        let result = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM access_tokens WHERE user_id = $1
            ",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn delete_oldest_for_user(&self, user_id: UserId) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM access_tokens
            WHERE id = (
                SELECT id FROM access_tokens
                WHERE user_id = $1
                ORDER BY created_at ASC, id ASC
                LIMIT 1
            )
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, token_digest))]
    async fn delete_by_digest(&self, user_id: UserId, token_digest: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM access_tokens
            WHERE user_id = $1 AND token_digest = $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(token_digest)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM access_tokens WHERE user_id = $1
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

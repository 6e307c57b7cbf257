//! PostgreSQL implementation of TwoFactorRepository
//!
//! The challenge state lives on the users table, so every mutation here is
//! a single-row UPDATE keyed by user id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use keygate_core::entities::TwoFactorState;
use keygate_core::traits::{RepoResult, TwoFactorRepository};
use keygate_core::value_objects::UserId;

use crate::models::TwoFactorModel;

use super::error::{map_db_error, user_not_found};

/// PostgreSQL implementation of TwoFactorRepository
#[derive(Clone)]
pub struct PgTwoFactorRepository {
    pool: PgPool,
}

impl PgTwoFactorRepository {
    /// Create a new PgTwoFactorRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn execute_for_user(&self, user_id: UserId, sql: &str) -> RepoResult<()> {
        let result = sqlx::query(sql)
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }

        Ok(())
    }
}

#[async_trait]
impl TwoFactorRepository for PgTwoFactorRepository {
    #[instrument(skip(self))]
    async fn get(&self, user_id: UserId) -> RepoResult<Option<TwoFactorState>> {
        let result = sqlx::query_as::<_, TwoFactorModel>(
            r"
            SELECT two_factor_enabled, two_factor_code, two_factor_expires_at,
                   two_factor_client_ip, two_factor_user_agent,
                   two_factor_last_requested_at, two_factor_request_attempts,
                   two_factor_verify_attempts
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(TwoFactorState::from))
    }

    #[instrument(skip(self))]
    async fn set_enabled(&self, user_id: UserId, enabled: bool) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET two_factor_enabled = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user_id.into_inner())
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }

        Ok(())
    }

    #[instrument(skip(self, code))]
    async fn store_code(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
        client_ip: &str,
        user_agent: &str,
        requested_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        // Overwrites any previously active code and zeroes the failed-guess
        // counter; the re-request counter is managed separately.
        let result = sqlx::query(
            r"
            UPDATE users
            SET two_factor_code = $2,
                two_factor_expires_at = $3,
                two_factor_client_ip = $4,
                two_factor_user_agent = $5,
                two_factor_last_requested_at = $6,
                two_factor_verify_attempts = 0,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user_id.into_inner())
        .bind(code)
        .bind(expires_at)
        .bind(client_ip)
        .bind(user_agent)
        .bind(requested_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_code(&self, user_id: UserId) -> RepoResult<()> {
        // last_requested_at survives so throttling still sees the most
        // recent request after the code itself is gone.
        self.execute_for_user(
            user_id,
            r"
            UPDATE users
            SET two_factor_code = NULL,
                two_factor_expires_at = NULL,
                two_factor_client_ip = NULL,
                two_factor_user_agent = NULL,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn increment_request_attempts(&self, user_id: UserId) -> RepoResult<()> {
        self.execute_for_user(
            user_id,
            r"
            UPDATE users
            SET two_factor_request_attempts = two_factor_request_attempts + 1,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn increment_verify_attempts(&self, user_id: UserId) -> RepoResult<()> {
        self.execute_for_user(
            user_id,
            r"
            UPDATE users
            SET two_factor_verify_attempts = two_factor_verify_attempts + 1,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn reset_attempts(&self, user_id: UserId) -> RepoResult<()> {
        self.execute_for_user(
            user_id,
            r"
            UPDATE users
            SET two_factor_request_attempts = 0,
                two_factor_verify_attempts = 0,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .await
    }
}

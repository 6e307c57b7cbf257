//! Access token issuance and validation
//!
//! Access tokens are opaque alphanumeric secrets. Only a SHA-256 digest is
//! stored, so per-request validation is a single indexed lookup; the secret
//! itself exists nowhere but in the response that issued it.

use keygate_common::auth::{digest_token, generate_secret, ACCESS_TOKEN_LENGTH};
use keygate_common::AppError;
use keygate_core::{User, UserId};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Issues and validates opaque access tokens
pub struct AccessTokenService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessTokenService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a new access token for the user, returning the plaintext secret.
    ///
    /// Enforces the per-user cap: when the stored count (expired rows
    /// included) has reached the configured maximum, the oldest row is
    /// dropped before the new one is inserted. A cap of zero means
    /// unlimited.
    #[instrument(skip(self))]
    pub async fn mint(&self, user_id: UserId) -> ServiceResult<String> {
        let cap = self.ctx.tokens().max_active_access_tokens;
        if cap > 0 {
            let count = self.ctx.access_token_repo().count_for_user(user_id).await?;
            if count >= i64::from(cap) {
                let evicted = self
                    .ctx
                    .access_token_repo()
                    .delete_oldest_for_user(user_id)
                    .await?;
                if evicted {
                    tracing::debug!(user_id = %user_id, cap, "evicted oldest access token");
                }
            }
        }

        let secret = generate_secret(ACCESS_TOKEN_LENGTH);
        let digest = digest_token(&secret);
        let expires_at = chrono::Utc::now() + self.ctx.tokens().access_ttl();
        self.ctx
            .access_token_repo()
            .insert(user_id, &digest, expires_at)
            .await?;

        Ok(secret)
    }

    /// Resolve a presented access token secret to its owning user.
    ///
    /// Unknown, expired, and orphaned tokens all fail the same way; the
    /// caller learns nothing about which it was.
    #[instrument(skip(self, secret))]
    pub async fn authenticate(&self, secret: &str) -> ServiceResult<User> {
        let digest = digest_token(secret);
        let record = self
            .ctx
            .access_token_repo()
            .find_valid_by_digest(&digest)
            .await?
            .ok_or(AppError::InvalidOrExpiredToken)?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(record.user_id)
            .await?
            .ok_or(AppError::InvalidOrExpiredToken)?;

        Ok(user)
    }

    /// Delete the single token matching the presented secret, reporting
    /// whether a row was removed
    #[instrument(skip(self, secret))]
    pub async fn revoke(&self, user_id: UserId, secret: &str) -> ServiceResult<bool> {
        let digest = digest_token(secret);
        Ok(self
            .ctx
            .access_token_repo()
            .delete_by_digest(user_id, &digest)
            .await?)
    }

    /// Delete every access token the user holds, returning the count
    #[instrument(skip(self))]
    pub async fn revoke_all(&self, user_id: UserId) -> ServiceResult<u64> {
        Ok(self
            .ctx
            .access_token_repo()
            .delete_all_for_user(user_id)
            .await?)
    }
}

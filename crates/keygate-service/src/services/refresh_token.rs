//! Refresh token rotation and replay detection
//!
//! Refresh tokens are single-use. Redeeming one flips its `used` flag before
//! any new credentials are handed out, so a second presentation of the same
//! plaintext lands in the replay branch: every access and refresh token the
//! owner holds is revoked and the request fails with `ReplayDetected`.
//!
//! Rows are stored as salted Argon2 hashes. A presented plaintext is matched
//! by scanning the live rows and verifying each hash; the deliberate cost of
//! that verification is what makes an offline attack on a leaked table
//! impractical.

use keygate_common::auth::{generate_secret, hash_token_secret, verify_token_secret, REFRESH_TOKEN_LENGTH};
use keygate_common::AppError;
use keygate_core::{NotificationEvent, UserId};
use tracing::instrument;

use super::access_token::AccessTokenService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Issues and redeems single-use refresh tokens
pub struct RefreshTokenService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RefreshTokenService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a new refresh token for the user, returning the plaintext secret
    #[instrument(skip(self))]
    pub async fn mint(&self, user_id: UserId) -> ServiceResult<String> {
        let secret = generate_secret(REFRESH_TOKEN_LENGTH);
        let hash = hash_token_secret(&secret)
            .map_err(|e| ServiceError::internal(format!("refresh token hashing failed: {e}")))?;
        let expires_at = chrono::Utc::now() + self.ctx.tokens().refresh_ttl();
        self.ctx
            .refresh_token_repo()
            .insert(user_id, &hash, expires_at)
            .await?;

        Ok(secret)
    }

    /// Redeem a presented refresh token, marking it used and returning the
    /// owning user.
    ///
    /// The `used` flip is conditional on the row still being unused and
    /// unrevoked, so two concurrent redemptions of the same plaintext race to
    /// a single winner; the loser falls into the replay branch along with any
    /// later re-presentation.
    #[instrument(skip(self, presented))]
    pub async fn redeem(&self, presented: &str) -> ServiceResult<UserId> {
        let candidates = self.ctx.refresh_token_repo().list_redeemable().await?;
        for row in &candidates {
            if verify_token_secret(presented, &row.token_hash)? {
                if self.ctx.refresh_token_repo().mark_used(row.id).await? {
                    tracing::debug!(user_id = %row.user_id, token_id = row.id, "refresh token redeemed");
                    return Ok(row.user_id);
                }
                // Another request redeemed this row between our scan and the
                // update. Same treatment as a replay.
                return self.replay_fallout(row.user_id).await;
            }
        }

        let redeemed = self.ctx.refresh_token_repo().list_redeemed().await?;
        for row in &redeemed {
            if verify_token_secret(presented, &row.token_hash)? {
                return self.replay_fallout(row.user_id).await;
            }
        }

        // Unknown, expired, or already revoked. Revoked rows match neither
        // scan, which is what keeps the replay alarm from firing twice.
        Err(AppError::InvalidRefreshToken.into())
    }

    /// Mark every not-yet-revoked refresh token of the user revoked,
    /// returning the count
    #[instrument(skip(self))]
    pub async fn revoke_all_for_user(&self, user_id: UserId) -> ServiceResult<u64> {
        Ok(self
            .ctx
            .refresh_token_repo()
            .revoke_all_for_user(user_id)
            .await?)
    }

    /// A used token was presented again: revoke the user's entire token set
    /// and alert them. The revocation happens before the error is returned,
    /// regardless of whether the notification gets delivered.
    async fn replay_fallout(&self, user_id: UserId) -> ServiceResult<UserId> {
        let refresh_revoked = self.revoke_all_for_user(user_id).await?;
        let access_deleted = AccessTokenService::new(self.ctx).revoke_all(user_id).await?;

        tracing::warn!(
            user_id = %user_id,
            refresh_revoked,
            access_deleted,
            "refresh token replay detected; all sessions revoked"
        );

        self.ctx
            .notifier()
            .notify(
                user_id,
                "A session renewal token was reused. All of your sessions have been signed out as a precaution.",
                NotificationEvent::SecurityAlert,
            )
            .await;

        Err(AppError::ReplayDetected.into())
    }
}

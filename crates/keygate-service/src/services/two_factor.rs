//! Two-factor challenge engine
//!
//! Completes logins that were deferred behind the second factor: resolves
//! the pending handle, throttles code re-requests per client and per
//! account, verifies submitted codes against a bounded guess budget, and
//! drives the enable/disable toggle.
//!
//! The throttles only apply to explicit re-requests. The code generated at
//! login time does not count against the quota, and failed guesses draw on
//! a separate budget, so one cannot starve the other.

use keygate_common::auth::{generate_numeric_code, verify_password, TokenPair};
use keygate_common::AppError;
use keygate_core::{NotificationEvent, TwoFactorState, UserId};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::SessionService;
use crate::dto::requests::ToggleTwoFactorRequest;

/// One-time-code challenge operations
pub struct TwoFactorService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TwoFactorService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Generate and store a fresh code for the user, replacing any active
    /// one, and hand it to the notifier for out-of-band delivery. The verify
    /// budget starts over; the re-request counter is the caller's business.
    pub(crate) async fn issue_challenge(
        &self,
        user_id: UserId,
        client_ip: &str,
        user_agent: &str,
    ) -> ServiceResult<()> {
        let code = generate_numeric_code();
        let now = chrono::Utc::now();
        let expires_at = now + self.ctx.two_factor().code_ttl();
        self.ctx
            .two_factor_repo()
            .store_code(user_id, &code, expires_at, client_ip, user_agent, now)
            .await?;

        tracing::info!(user_id = %user_id, "two-factor code generated");
        self.ctx
            .notifier()
            .notify(
                user_id,
                &format!("Your verification code is {code}."),
                NotificationEvent::NewTwoFactorCode,
            )
            .await;

        Ok(())
    }

    /// Issue a replacement code for a pending login.
    ///
    /// Throttled twice, in order: the per-client rule fires when the same
    /// IP and user-agent keep asking within the client delay, the global
    /// rule when the account as a whole is asked too often. The reported
    /// retry-after is the full configured delay, not the remaining time.
    #[instrument(skip(self, handle))]
    pub async fn request_new_code(
        &self,
        handle: &str,
        client_ip: &str,
        user_agent: &str,
    ) -> ServiceResult<()> {
        let (user_id, state) = self.resolve_handle(handle).await?;
        self.check_rate_limits(&state, client_ip, user_agent)?;

        self.issue_challenge(user_id, client_ip, user_agent).await?;
        self.ctx
            .two_factor_repo()
            .increment_request_attempts(user_id)
            .await?;

        Ok(())
    }

    /// Verify a submitted code and complete the pending login.
    ///
    /// Expired, absent, and mismatched codes all report the same error. A
    /// mismatch spends one guess; when the budget runs out, the active code
    /// is invalidated and only a fresh one can continue the login. The
    /// pending handle itself is not consumed and simply ages out.
    #[instrument(skip(self, handle, candidate))]
    pub async fn verify_code(&self, handle: &str, candidate: &str) -> ServiceResult<TokenPair> {
        let (user_id, state) = self.resolve_handle(handle).await?;

        if !state.code_matches(candidate) {
            if state.has_active_code() {
                self.ctx
                    .two_factor_repo()
                    .increment_verify_attempts(user_id)
                    .await?;
                let attempts = state.verify_attempts + 1;
                if attempts >= self.ctx.two_factor().max_verify_attempts {
                    self.ctx.two_factor_repo().clear_code(user_id).await?;
                    tracing::warn!(
                        user_id = %user_id,
                        attempts,
                        "verify budget exhausted; active code invalidated"
                    );
                }
            }
            return Err(AppError::InvalidOrExpiredCode.into());
        }

        self.ctx.two_factor_repo().clear_code(user_id).await?;
        self.ctx.two_factor_repo().reset_attempts(user_id).await?;

        tracing::info!(user_id = %user_id, "two-factor verification succeeded");
        self.ctx
            .notifier()
            .notify(
                user_id,
                "Two-factor verification completed.",
                NotificationEvent::TwoFactorVerified,
            )
            .await;

        SessionService::new(self.ctx).issue_pair(user_id).await
    }

    /// Enable or disable two-factor authentication for the user.
    ///
    /// The password is always required. Disabling while a code is still
    /// active additionally requires that code, so a stolen session cannot
    /// quietly switch the protection off mid-challenge. Toggling to the
    /// current state changes nothing.
    #[instrument(skip(self, req))]
    pub async fn toggle(&self, user_id: UserId, req: ToggleTwoFactorRequest) -> ServiceResult<bool> {
        let stored_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user_id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(&req.password, &stored_hash)? {
            return Err(AppError::InvalidCredentials.into());
        }

        let state = self
            .ctx
            .two_factor_repo()
            .get(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        if state.enabled == req.enabled {
            return Ok(state.enabled);
        }

        if !req.enabled && state.has_active_code() {
            let presented = req.two_factor_code.as_deref().unwrap_or_default();
            if !state.code_matches(presented) {
                return Err(AppError::InvalidOrExpiredCode.into());
            }
        }

        self.ctx
            .two_factor_repo()
            .set_enabled(user_id, req.enabled)
            .await?;

        if req.enabled {
            tracing::info!(user_id = %user_id, "two-factor authentication enabled");
            self.ctx
                .notifier()
                .notify(
                    user_id,
                    "Two-factor authentication was enabled on your account.",
                    NotificationEvent::TwoFactorEnabled,
                )
                .await;
        } else {
            self.ctx.two_factor_repo().clear_code(user_id).await?;
            self.ctx.two_factor_repo().reset_attempts(user_id).await?;
            tracing::info!(user_id = %user_id, "two-factor authentication disabled");
            self.ctx
                .notifier()
                .notify(
                    user_id,
                    "Two-factor authentication was disabled on your account.",
                    NotificationEvent::TwoFactorDisabled,
                )
                .await;
        }

        Ok(req.enabled)
    }

    /// Pending handle → (user, challenge state). The handle is looked up but
    /// never consumed; Redis expiry is what ends its life.
    async fn resolve_handle(&self, handle: &str) -> ServiceResult<(UserId, TwoFactorState)> {
        let user_id = self
            .ctx
            .pending_sessions()
            .resolve(handle)
            .await?
            .ok_or(AppError::InvalidPendingSession)?;
        let state = self
            .ctx
            .two_factor_repo()
            .get(user_id)
            .await?
            .ok_or(AppError::InvalidPendingSession)?;
        if !state.enabled {
            return Err(AppError::TwoFactorNotEnabled.into());
        }
        Ok((user_id, state))
    }

    /// Per-client rule first, then the account-wide rule
    fn check_rate_limits(
        &self,
        state: &TwoFactorState,
        client_ip: &str,
        user_agent: &str,
    ) -> ServiceResult<()> {
        let cfg = self.ctx.two_factor();
        let Some(last_requested) = state.last_requested_at else {
            return Ok(());
        };
        let now = chrono::Utc::now();

        if state.request_attempts >= cfg.client_threshold
            && state.same_client(client_ip, user_agent)
            && last_requested + cfg.client_delay() > now
        {
            let retry_after = u64::try_from(cfg.client_delay_seconds).unwrap_or(0);
            return Err(AppError::rate_limited(retry_after).into());
        }

        if state.request_attempts >= cfg.global_threshold
            && last_requested + cfg.global_delay() > now
        {
            let retry_after = u64::try_from(cfg.global_delay_seconds).unwrap_or(0);
            return Err(AppError::rate_limited(retry_after).into());
        }

        Ok(())
    }
}

//! Session orchestration: registration, login, logout, password changes
//!
//! Login either completes immediately with a token pair or, for accounts
//! with two-factor authentication enabled, parks the first factor behind a
//! pending handle and hands the completion over to the 2FA endpoints.

use keygate_common::auth::{
    generate_pending_handle, hash_password, validate_password_strength, verify_password, TokenPair,
};
use keygate_common::AppError;
use keygate_core::entities::AccessTokenRecord;
use keygate_core::{DomainError, NotificationEvent, User, UserId};
use tracing::instrument;

use super::access_token::AccessTokenService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::refresh_token::RefreshTokenService;
use super::two_factor::TwoFactorService;
use crate::dto::mappers::UserWithTwoFactor;
use crate::dto::requests::{ChangePasswordRequest, LoginRequest, RegisterRequest};

/// What a successful first factor produced
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials checked out and no second factor is required
    Authenticated(TokenPair),
    /// Credentials checked out but the account is 2FA-gated; the caller
    /// completes the session through the 2FA endpoints using this handle
    TwoFactorRequired { pending_token: String },
}

/// Entry points for the session lifecycle
pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a new account. No tokens are issued; the caller logs in
    /// separately.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<User> {
        validate_username(&req.username)?;
        validate_password_strength(&req.password)?;

        if self.ctx.user_repo().username_exists(&req.username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }
        if self.ctx.user_repo().email_exists(&req.email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = hash_password(&req.password)?;
        let user = self
            .ctx
            .user_repo()
            .create(&req.username, &req.email, &password_hash)
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        self.ctx
            .notifier()
            .notify(
                user.id,
                "Your account has been created.",
                NotificationEvent::UserRegistered,
            )
            .await;

        Ok(user)
    }

    /// Verify the first factor and either issue a token pair or defer behind
    /// the 2FA challenge.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(
        &self,
        req: LoginRequest,
        client_ip: &str,
        user_agent: &str,
    ) -> ServiceResult<LoginOutcome> {
        let user = self
            .ctx
            .user_repo()
            .find_by_username(&req.username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        let stored_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(&req.password, &stored_hash)? {
            return Err(AppError::InvalidCredentials.into());
        }

        self.ctx
            .notifier()
            .notify(user.id, "New sign-in to your account.", NotificationEvent::UserLogin)
            .await;

        let challenge = self.ctx.two_factor_repo().get(user.id).await?;
        if challenge.is_some_and(|c| c.enabled) {
            let pending_token = generate_pending_handle();
            self.ctx
                .pending_sessions()
                .put(
                    &pending_token,
                    user.id,
                    self.ctx.two_factor().pending_handle_ttl_seconds(),
                )
                .await?;
            // The initial code does not count against the re-request quota.
            TwoFactorService::new(self.ctx)
                .issue_challenge(user.id, client_ip, user_agent)
                .await?;

            tracing::info!(user_id = %user.id, "login deferred behind two-factor challenge");
            return Ok(LoginOutcome::TwoFactorRequired { pending_token });
        }

        let pair = self.issue_pair(user.id).await?;
        Ok(LoginOutcome::Authenticated(pair))
    }

    /// Issue a fresh access/refresh pair. Shared by login, 2FA verification,
    /// and refresh.
    #[instrument(skip(self))]
    pub async fn issue_pair(&self, user_id: UserId) -> ServiceResult<TokenPair> {
        let access = AccessTokenService::new(self.ctx).mint(user_id).await?;
        let refresh = RefreshTokenService::new(self.ctx).mint(user_id).await?;
        Ok(TokenPair::bearer(
            access,
            refresh,
            self.ctx.tokens().access_ttl_seconds(),
        ))
    }

    /// Trade a refresh token for a new pair. The presented token is consumed;
    /// replay handling lives in [`RefreshTokenService::redeem`].
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let user_id = RefreshTokenService::new(self.ctx)
            .redeem(refresh_token)
            .await?;
        let pair = self.issue_pair(user_id).await?;

        self.ctx
            .notifier()
            .notify(
                user_id,
                "Your session was renewed.",
                NotificationEvent::TokensRefreshed,
            )
            .await;

        Ok(pair)
    }

    /// Delete the access token the request authenticated with. Idempotent:
    /// logging out an already-deleted token is not an error.
    #[instrument(skip(self, access_secret))]
    pub async fn logout(&self, user_id: UserId, access_secret: &str) -> ServiceResult<()> {
        let deleted = AccessTokenService::new(self.ctx)
            .revoke(user_id, access_secret)
            .await?;

        tracing::info!(user_id = %user_id, deleted, "logout");
        self.ctx
            .notifier()
            .notify(user_id, "You signed out of a session.", NotificationEvent::UserLogout)
            .await;

        Ok(())
    }

    /// Delete every access token and revoke every refresh token the user
    /// holds.
    #[instrument(skip(self))]
    pub async fn logout_all(&self, user_id: UserId) -> ServiceResult<()> {
        let access_deleted = AccessTokenService::new(self.ctx).revoke_all(user_id).await?;
        let refresh_revoked = RefreshTokenService::new(self.ctx)
            .revoke_all_for_user(user_id)
            .await?;

        tracing::info!(user_id = %user_id, access_deleted, refresh_revoked, "logout all");
        self.ctx
            .notifier()
            .notify(
                user_id,
                "You signed out of all sessions.",
                NotificationEvent::UserLogoutAll,
            )
            .await;

        Ok(())
    }

    /// Change the password and force re-authentication everywhere: the whole
    /// token set is revoked, including the session making the request.
    #[instrument(skip(self, req))]
    pub async fn change_password(
        &self,
        user_id: UserId,
        req: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        let stored_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user_id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(&req.current_password, &stored_hash)? {
            return Err(AppError::InvalidCredentials.into());
        }
        validate_password_strength(&req.new_password)?;

        let new_hash = hash_password(&req.new_password)?;
        self.ctx
            .user_repo()
            .update_password(user_id, &new_hash)
            .await?;

        let access_deleted = AccessTokenService::new(self.ctx).revoke_all(user_id).await?;
        let refresh_revoked = RefreshTokenService::new(self.ctx)
            .revoke_all_for_user(user_id)
            .await?;

        tracing::info!(
            user_id = %user_id,
            access_deleted,
            refresh_revoked,
            "password changed; all sessions revoked"
        );
        self.ctx
            .notifier()
            .notify(
                user_id,
                "Your password was changed and all sessions were signed out.",
                NotificationEvent::PasswordChanged,
            )
            .await;

        Ok(())
    }

    /// The authenticated user together with their two-factor flag
    #[instrument(skip(self))]
    pub async fn current_user(&self, user_id: UserId) -> ServiceResult<UserWithTwoFactor> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| super::error::ServiceError::not_found("User", user_id.to_string()))?;
        let two_factor_enabled = self
            .ctx
            .two_factor_repo()
            .get(user_id)
            .await?
            .is_some_and(|c| c.enabled);

        Ok(UserWithTwoFactor {
            user,
            two_factor_enabled,
        })
    }

    /// Metadata for the user's stored access tokens, oldest first
    #[instrument(skip(self))]
    pub async fn list_access_tokens(&self, user_id: UserId) -> ServiceResult<Vec<AccessTokenRecord>> {
        Ok(self.ctx.access_token_repo().list_for_user(user_id).await?)
    }
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    let acceptable = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if acceptable {
        Ok(())
    } else {
        Err(DomainError::InvalidUsername(
            "only letters, digits, '.', '-' and '_' are allowed".to_string(),
        ))
    }
}

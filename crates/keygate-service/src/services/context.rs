//! Service context - dependency container for services
//!
//! Holds the repository ports, the pending-session store, the notifier, and
//! the typed configuration the engines run on. Services only ever see the
//! trait objects, so tests can swap in in-memory fakes.

use std::sync::Arc;

use keygate_common::config::{TokenConfig, TwoFactorConfig};
use keygate_core::traits::{
    AccessTokenRepository, Notifier, PendingSessionStore, RefreshTokenRepository,
    TwoFactorRepository, UserRepository,
};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories (users, access tokens, refresh tokens, 2FA state)
/// - The Redis-backed pending-session store
/// - The notifier used for out-of-band user messages
/// - Token and two-factor configuration
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    access_token_repo: Arc<dyn AccessTokenRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    two_factor_repo: Arc<dyn TwoFactorRepository>,

    // Cache-backed stores
    pending_sessions: Arc<dyn PendingSessionStore>,

    // Outbound
    notifier: Arc<dyn Notifier>,

    // Configuration
    tokens: TokenConfig,
    two_factor: TwoFactorConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        access_token_repo: Arc<dyn AccessTokenRepository>,
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        two_factor_repo: Arc<dyn TwoFactorRepository>,
        pending_sessions: Arc<dyn PendingSessionStore>,
        notifier: Arc<dyn Notifier>,
        tokens: TokenConfig,
        two_factor: TwoFactorConfig,
    ) -> Self {
        Self {
            user_repo,
            access_token_repo,
            refresh_token_repo,
            two_factor_repo,
            pending_sessions,
            notifier,
            tokens,
            two_factor,
        }
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the access token repository
    pub fn access_token_repo(&self) -> &dyn AccessTokenRepository {
        self.access_token_repo.as_ref()
    }

    /// Get the refresh token repository
    pub fn refresh_token_repo(&self) -> &dyn RefreshTokenRepository {
        self.refresh_token_repo.as_ref()
    }

    /// Get the two-factor state repository
    pub fn two_factor_repo(&self) -> &dyn TwoFactorRepository {
        self.two_factor_repo.as_ref()
    }

    // === Cache Stores ===

    /// Get the pending two-factor session store
    pub fn pending_sessions(&self) -> &dyn PendingSessionStore {
        self.pending_sessions.as_ref()
    }

    // === Outbound ===

    /// Get the notifier
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    // === Configuration ===

    /// Token issuance configuration
    pub fn tokens(&self) -> &TokenConfig {
        &self.tokens
    }

    /// Two-factor challenge configuration
    pub fn two_factor(&self) -> &TwoFactorConfig {
        &self.two_factor
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("pending_sessions", &"...")
            .field("tokens", &self.tokens)
            .field("two_factor", &self.two_factor)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    access_token_repo: Option<Arc<dyn AccessTokenRepository>>,
    refresh_token_repo: Option<Arc<dyn RefreshTokenRepository>>,
    two_factor_repo: Option<Arc<dyn TwoFactorRepository>>,
    pending_sessions: Option<Arc<dyn PendingSessionStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    tokens: Option<TokenConfig>,
    two_factor: Option<TwoFactorConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            access_token_repo: None,
            refresh_token_repo: None,
            two_factor_repo: None,
            pending_sessions: None,
            notifier: None,
            tokens: None,
            two_factor: None,
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn access_token_repo(mut self, repo: Arc<dyn AccessTokenRepository>) -> Self {
        self.access_token_repo = Some(repo);
        self
    }

    pub fn refresh_token_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_token_repo = Some(repo);
        self
    }

    pub fn two_factor_repo(mut self, repo: Arc<dyn TwoFactorRepository>) -> Self {
        self.two_factor_repo = Some(repo);
        self
    }

    pub fn pending_sessions(mut self, store: Arc<dyn PendingSessionStore>) -> Self {
        self.pending_sessions = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn tokens(mut self, config: TokenConfig) -> Self {
        self.tokens = Some(config);
        self
    }

    pub fn two_factor(mut self, config: TwoFactorConfig) -> Self {
        self.two_factor = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.access_token_repo
                .ok_or_else(|| ServiceError::validation("access_token_repo is required"))?,
            self.refresh_token_repo
                .ok_or_else(|| ServiceError::validation("refresh_token_repo is required"))?,
            self.two_factor_repo
                .ok_or_else(|| ServiceError::validation("two_factor_repo is required"))?,
            self.pending_sessions
                .ok_or_else(|| ServiceError::validation("pending_sessions is required"))?,
            self.notifier
                .ok_or_else(|| ServiceError::validation("notifier is required"))?,
            self.tokens
                .ok_or_else(|| ServiceError::validation("tokens config is required"))?,
            self.two_factor
                .ok_or_else(|| ServiceError::validation("two_factor config is required"))?,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

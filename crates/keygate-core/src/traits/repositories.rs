//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{AccessTokenRecord, RefreshTokenRecord, TwoFactorState, User};
use crate::error::DomainError;
use crate::events::NotificationEvent;
use crate::value_objects::UserId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository (credential store)
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Check if username is already taken
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user; the database assigns the id
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> RepoResult<User>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()>;
}

// ============================================================================
// Access Token Repository
// ============================================================================

#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    /// Insert a new token record; the database assigns the id
    async fn insert(
        &self,
        user_id: UserId,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<AccessTokenRecord>;

    /// Find an unexpired record by digest
    async fn find_valid_by_digest(&self, token_digest: &str) -> RepoResult<Option<AccessTokenRecord>>;

    /// List all token records of a user, oldest first
    async fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<AccessTokenRecord>>;

    /// Count all token records of a user
    async fn count_for_user(&self, user_id: UserId) -> RepoResult<i64>;

    /// Delete the user's single oldest record; false if there was none
    async fn delete_oldest_for_user(&self, user_id: UserId) -> RepoResult<bool>;

    /// Delete the user's record matching the digest; false if no match
    async fn delete_by_digest(&self, user_id: UserId, token_digest: &str) -> RepoResult<bool>;

    /// Delete every record of the user, returning how many were removed
    async fn delete_all_for_user(&self, user_id: UserId) -> RepoResult<u64>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert a new token record; the database assigns the id
    async fn insert(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshTokenRecord>;

    /// All unexpired records with `used=false, revoked=false`, i.e. the set a
    /// presented plaintext may legitimately match
    async fn list_redeemable(&self) -> RepoResult<Vec<RefreshTokenRecord>>;

    /// All unexpired records with `used=true, revoked=false`, i.e. the set
    /// whose match means a replay
    async fn list_redeemed(&self) -> RepoResult<Vec<RefreshTokenRecord>>;

    /// Atomically flip `used=false → used=true` on one record. Returns false
    /// when the record was already used or revoked, which is how a lost
    /// redemption race announces itself.
    async fn mark_used(&self, id: i64) -> RepoResult<bool>;

    /// Set `revoked=true` on every not-yet-revoked record of the user,
    /// returning how many were affected
    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64>;
}

// ============================================================================
// Two-Factor Repository
// ============================================================================
//
// The challenge state lives on the user row; every method below is a
// single-row atomic update keyed by user id.

#[async_trait]
pub trait TwoFactorRepository: Send + Sync {
    /// Read the user's challenge state; None if the user does not exist
    async fn get(&self, user_id: UserId) -> RepoResult<Option<TwoFactorState>>;

    /// Flip the enabled flag
    async fn set_enabled(&self, user_id: UserId, enabled: bool) -> RepoResult<()>;

    /// Store a fresh code with its expiry and requester identity, stamping
    /// the last-request time and resetting the verify counter to zero. Any
    /// previously active code is overwritten.
    async fn store_code(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
        client_ip: &str,
        user_agent: &str,
        requested_at: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Clear code, expiry, and requester identity; both attempt counters
    /// keep their values
    async fn clear_code(&self, user_id: UserId) -> RepoResult<()>;

    /// Bump the re-request counter
    async fn increment_request_attempts(&self, user_id: UserId) -> RepoResult<()>;

    /// Bump the failed-guess counter
    async fn increment_verify_attempts(&self, user_id: UserId) -> RepoResult<()>;

    /// Zero both attempt counters
    async fn reset_attempts(&self, user_id: UserId) -> RepoResult<()>;
}

// ============================================================================
// Pending Session Store
// ============================================================================

#[async_trait]
pub trait PendingSessionStore: Send + Sync {
    /// Bind a handle to a user for `ttl_seconds`
    async fn put(&self, handle: &str, user_id: UserId, ttl_seconds: u64) -> RepoResult<()>;

    /// Resolve a handle back to its user; None when unknown or expired.
    /// Resolution does not consume the handle.
    async fn resolve(&self, handle: &str) -> RepoResult<Option<UserId>>;
}

// ============================================================================
// Notifier
// ============================================================================

/// Outbound "deliver a message to a user" capability. Channel selection and
/// fan-out belong to the implementation; callers fire and forget. Delivery
/// must never block or fail a session operation, so there is no error to
/// return.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: UserId, message: &str, event: NotificationEvent);
}

//! In-memory fakes for service tests
//!
//! Each fake keeps its rows behind a `std::sync::Mutex` and implements the
//! corresponding port trait with the same observable behavior as the real
//! Postgres/Redis adapters, including the conditional `mark_used` update
//! that decides redemption races.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use keygate_common::auth::hash_password;
use keygate_common::config::{TokenConfig, TwoFactorConfig};
use keygate_core::entities::{AccessTokenRecord, RefreshTokenRecord, TwoFactorState, User};
use keygate_core::traits::{
    AccessTokenRepository, Notifier, PendingSessionStore, RefreshTokenRepository, RepoResult,
    TwoFactorRepository, UserRepository,
};
use keygate_core::{DomainError, NotificationEvent, UserId};

use super::context::{ServiceContext, ServiceContextBuilder};
use crate::dto::requests::RegisterRequest;

// ============================================================================
// Users
// ============================================================================

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
pub(crate) struct InMemoryUsers {
    rows: Mutex<Vec<StoredUser>>,
    next_id: AtomicI64,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.user.id == id).map(|r| r.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.user.username == username)
            .map(|r| r.user.clone()))
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().any(|r| r.user.username == username))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().any(|r| r.user.email == email))
    }

    async fn create(&self, username: &str, email: &str, password_hash: &str) -> RepoResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.user.username == username) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if rows.iter().any(|r| r.user.email == email) {
            return Err(DomainError::EmailAlreadyExists);
        }
        let id = UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let user = User::new(id, username.to_string(), email.to_string());
        rows.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(user)
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.password_hash.clone()))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.user.id == id)
            .ok_or(DomainError::UserNotFound(id))?;
        row.password_hash = password_hash.to_string();
        row.user.updated_at = Utc::now();
        Ok(())
    }
}

// ============================================================================
// Access tokens
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryAccessTokens {
    rows: Mutex<Vec<AccessTokenRecord>>,
    next_id: AtomicI64,
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccessTokens {
    async fn insert(
        &self,
        user_id: UserId,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<AccessTokenRecord> {
        let record = AccessTokenRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id,
            token_digest: token_digest.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn find_valid_by_digest(
        &self,
        token_digest: &str,
    ) -> RepoResult<Option<AccessTokenRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.token_digest == token_digest && !r.is_expired())
            .cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> RepoResult<Vec<AccessTokenRecord>> {
        let rows = self.rows.lock().unwrap();
        let mut result: Vec<_> = rows.iter().filter(|r| r.user_id == user_id).cloned().collect();
        result.sort_by_key(|r| (r.created_at, r.id));
        Ok(result)
    }

    async fn count_for_user(&self, user_id: UserId) -> RepoResult<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| r.user_id == user_id).count() as i64)
    }

    async fn delete_oldest_for_user(&self, user_id: UserId) -> RepoResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let oldest = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.user_id == user_id)
            .min_by_key(|(_, r)| (r.created_at, r.id))
            .map(|(i, _)| i);
        match oldest {
            Some(index) => {
                rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_digest(&self, user_id: UserId, token_digest: &str) -> RepoResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.user_id == user_id && r.token_digest == token_digest));
        Ok(rows.len() < before)
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.user_id != user_id);
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Refresh tokens
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryRefreshTokens {
    rows: Mutex<Vec<RefreshTokenRecord>>,
    next_id: AtomicI64,
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn insert(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshTokenRecord> {
        let record = RefreshTokenRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id,
            token_hash: token_hash.to_string(),
            used: false,
            revoked: false,
            expires_at,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_redeemable(&self) -> RepoResult<Vec<RefreshTokenRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| r.is_redeemable()).cloned().collect())
    }

    async fn list_redeemed(&self) -> RepoResult<Vec<RefreshTokenRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.is_replay_candidate())
            .cloned()
            .collect())
    }

    async fn mark_used(&self, id: i64) -> RepoResult<bool> {
        // Check and flip under one lock, like the conditional UPDATE.
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) if !row.used && !row.revoked => {
                row.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut affected = 0;
        for row in rows.iter_mut().filter(|r| r.user_id == user_id && !r.revoked) {
            row.revoked = true;
            affected += 1;
        }
        Ok(affected)
    }
}

// ============================================================================
// Two-factor state
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryTwoFactor {
    states: Mutex<HashMap<i64, TwoFactorState>>,
}

impl InMemoryTwoFactor {
    /// Give the user a default (disabled) state row, as creating the user
    /// row would in Postgres
    pub(crate) fn seed(&self, user_id: UserId) {
        self.states
            .lock()
            .unwrap()
            .insert(user_id.into_inner(), TwoFactorState::default());
    }

    /// Snapshot of the user's state; panics when the user was never seeded
    pub(crate) fn state(&self, user_id: UserId) -> TwoFactorState {
        self.states
            .lock()
            .unwrap()
            .get(&user_id.into_inner())
            .cloned()
            .unwrap()
    }

    /// Shift the last-request stamp into the past to simulate waiting
    pub(crate) fn backdate_last_request(&self, user_id: UserId, seconds: i64) {
        let mut states = self.states.lock().unwrap();
        let state = states.get_mut(&user_id.into_inner()).unwrap();
        state.last_requested_at = state
            .last_requested_at
            .map(|t| t - Duration::seconds(seconds));
    }

    /// Push the active code's expiry into the past
    pub(crate) fn expire_code(&self, user_id: UserId) {
        let mut states = self.states.lock().unwrap();
        let state = states.get_mut(&user_id.into_inner()).unwrap();
        state.code_expires_at = Some(Utc::now() - Duration::seconds(1));
    }

    fn update<F>(&self, user_id: UserId, f: F) -> RepoResult<()>
    where
        F: FnOnce(&mut TwoFactorState),
    {
        let mut states = self.states.lock().unwrap();
        let state = states
            .get_mut(&user_id.into_inner())
            .ok_or(DomainError::UserNotFound(user_id))?;
        f(state);
        Ok(())
    }
}

#[async_trait]
impl TwoFactorRepository for InMemoryTwoFactor {
    async fn get(&self, user_id: UserId) -> RepoResult<Option<TwoFactorState>> {
        let states = self.states.lock().unwrap();
        Ok(states.get(&user_id.into_inner()).cloned())
    }

    async fn set_enabled(&self, user_id: UserId, enabled: bool) -> RepoResult<()> {
        self.update(user_id, |s| s.enabled = enabled)
    }

    async fn store_code(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
        client_ip: &str,
        user_agent: &str,
        requested_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.update(user_id, |s| {
            s.code = Some(code.to_string());
            s.code_expires_at = Some(expires_at);
            s.client_ip = Some(client_ip.to_string());
            s.user_agent = Some(user_agent.to_string());
            s.last_requested_at = Some(requested_at);
            s.verify_attempts = 0;
        })
    }

    async fn clear_code(&self, user_id: UserId) -> RepoResult<()> {
        self.update(user_id, |s| {
            s.code = None;
            s.code_expires_at = None;
            s.client_ip = None;
            s.user_agent = None;
        })
    }

    async fn increment_request_attempts(&self, user_id: UserId) -> RepoResult<()> {
        self.update(user_id, |s| s.request_attempts += 1)
    }

    async fn increment_verify_attempts(&self, user_id: UserId) -> RepoResult<()> {
        self.update(user_id, |s| s.verify_attempts += 1)
    }

    async fn reset_attempts(&self, user_id: UserId) -> RepoResult<()> {
        self.update(user_id, |s| {
            s.request_attempts = 0;
            s.verify_attempts = 0;
        })
    }
}

// ============================================================================
// Pending sessions
// ============================================================================

#[derive(Default)]
pub(crate) struct InMemoryPendingSessions {
    entries: Mutex<HashMap<String, (i64, u64)>>,
}

impl InMemoryPendingSessions {
    /// The TTL the handle was stored with, for assertions
    pub(crate) fn stored_ttl(&self, handle: &str) -> Option<u64> {
        let entries = self.entries.lock().unwrap();
        entries.get(handle).map(|(_, ttl)| *ttl)
    }
}

#[async_trait]
impl PendingSessionStore for InMemoryPendingSessions {
    async fn put(&self, handle: &str, user_id: UserId, ttl_seconds: u64) -> RepoResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(handle.to_string(), (user_id.into_inner(), ttl_seconds));
        Ok(())
    }

    async fn resolve(&self, handle: &str) -> RepoResult<Option<UserId>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(handle).map(|(id, _)| UserId::new(*id)))
    }
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    deliveries: Mutex<Vec<(i64, String, NotificationEvent)>>,
}

impl RecordingNotifier {
    pub(crate) fn count(&self, event: NotificationEvent) -> usize {
        let deliveries = self.deliveries.lock().unwrap();
        deliveries.iter().filter(|(_, _, e)| *e == event).count()
    }

    pub(crate) fn last_message(&self, event: NotificationEvent) -> Option<String> {
        let deliveries = self.deliveries.lock().unwrap();
        deliveries
            .iter()
            .rev()
            .find(|(_, _, e)| *e == event)
            .map(|(_, message, _)| message.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: UserId, message: &str, event: NotificationEvent) {
        self.deliveries
            .lock()
            .unwrap()
            .push((user_id.into_inner(), message.to_string(), event));
    }
}

// ============================================================================
// Harness
// ============================================================================

pub(crate) struct TestHarness {
    pub ctx: ServiceContext,
    pub two_factor: Arc<InMemoryTwoFactor>,
    pub pending: Arc<InMemoryPendingSessions>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    /// Create a user directly through the repository with a real argon2
    /// hash, as registration would
    pub(crate) async fn seed_user(&self, username: &str, password: &str) -> User {
        let hash = hash_password(password).unwrap();
        let email = format!("{username}@example.com");
        let user = self
            .ctx
            .user_repo()
            .create(username, &email, &hash)
            .await
            .unwrap();
        self.two_factor.seed(user.id);
        user
    }

    pub(crate) async fn enable_two_factor(&self, user_id: UserId) {
        self.ctx
            .two_factor_repo()
            .set_enabled(user_id, true)
            .await
            .unwrap();
    }
}

pub(crate) fn default_token_config() -> TokenConfig {
    TokenConfig {
        access_ttl_minutes: 60,
        refresh_ttl_days: 7,
        max_active_access_tokens: 5,
    }
}

pub(crate) fn default_two_factor_config() -> TwoFactorConfig {
    TwoFactorConfig {
        code_ttl_minutes: 5,
        client_threshold: 3,
        client_delay_seconds: 30,
        global_threshold: 5,
        global_delay_seconds: 50,
        max_verify_attempts: 5,
    }
}

/// Default two-factor config with one field tweaked
pub(crate) fn two_factor_config(adjust: impl FnOnce(&mut TwoFactorConfig)) -> TwoFactorConfig {
    let mut config = default_two_factor_config();
    adjust(&mut config);
    config
}

pub(crate) fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub(crate) fn harness() -> TestHarness {
    build(default_token_config(), default_two_factor_config())
}

pub(crate) fn harness_with_cap(cap: u32) -> TestHarness {
    let mut tokens = default_token_config();
    tokens.max_active_access_tokens = cap;
    build(tokens, default_two_factor_config())
}

pub(crate) fn harness_with_two_factor(config: TwoFactorConfig) -> TestHarness {
    build(default_token_config(), config)
}

fn build(tokens: TokenConfig, two_factor_config: TwoFactorConfig) -> TestHarness {
    let users = Arc::new(InMemoryUsers::default());
    let access = Arc::new(InMemoryAccessTokens::default());
    let refresh = Arc::new(InMemoryRefreshTokens::default());
    let two_factor = Arc::new(InMemoryTwoFactor::default());
    let pending = Arc::new(InMemoryPendingSessions::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let ctx = ServiceContextBuilder::new()
        .user_repo(users)
        .access_token_repo(access)
        .refresh_token_repo(refresh)
        .two_factor_repo(two_factor.clone())
        .pending_sessions(pending.clone())
        .notifier(notifier.clone())
        .tokens(tokens)
        .two_factor(two_factor_config)
        .build()
        .unwrap();

    TestHarness {
        ctx,
        two_factor,
        pending,
        notifier,
    }
}

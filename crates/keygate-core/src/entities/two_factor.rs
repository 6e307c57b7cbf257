//! Two-factor challenge state - per-user one-time-code state machine
//!
//! The state lives on the user row and moves through
//! `disabled → pending (code active) → consumed/expired/invalidated →
//! pending again on re-request`. At most one code is active per user at a
//! time; storing a new code replaces the previous one.
//!
//! Two attempt counters with different jobs:
//! - `request_attempts` counts explicit code re-requests and feeds the
//!   per-client and global throttles,
//! - `verify_attempts` counts failed guesses against the active code and is
//!   reset whenever a fresh code is stored.
//! Keeping them separate means a burst of wrong guesses cannot exhaust the
//! re-request quota, and vice versa.

use chrono::{DateTime, Utc};

/// Snapshot of a user's two-factor columns. Mutations go through
/// `TwoFactorRepository` as single-row atomic updates; this value object is
/// only ever a read snapshot plus pure helpers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TwoFactorState {
    pub enabled: bool,
    pub code: Option<String>,
    pub code_expires_at: Option<DateTime<Utc>>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub last_requested_at: Option<DateTime<Utc>>,
    pub request_attempts: i32,
    pub verify_attempts: i32,
}

/// Where the challenge state machine currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeStatus {
    /// Two-factor auth is switched off for this user
    Disabled,
    /// Enabled, no code outstanding
    Idle,
    /// A code is outstanding and unexpired
    Pending,
    /// A code is outstanding but past its TTL
    Expired,
}

impl TwoFactorState {
    /// True iff a code exists and its expiry is in the future
    pub fn has_active_code(&self) -> bool {
        match (&self.code, self.code_expires_at) {
            (Some(_), Some(expires_at)) => Utc::now() < expires_at,
            _ => false,
        }
    }

    /// Exact match against the active code only. An expired or absent code
    /// never matches; the caller cannot tell which case it hit.
    pub fn code_matches(&self, candidate: &str) -> bool {
        if !self.has_active_code() {
            return false;
        }
        self.code.as_deref() == Some(candidate)
    }

    /// True iff the stored requester identity equals the given one
    pub fn same_client(&self, client_ip: &str, user_agent: &str) -> bool {
        self.client_ip.as_deref() == Some(client_ip)
            && self.user_agent.as_deref() == Some(user_agent)
    }

    /// Current position in the state machine
    pub fn status(&self) -> ChallengeStatus {
        if !self.enabled {
            return ChallengeStatus::Disabled;
        }
        match (&self.code, self.code_expires_at) {
            (Some(_), Some(expires_at)) if Utc::now() < expires_at => ChallengeStatus::Pending,
            (Some(_), _) => ChallengeStatus::Expired,
            _ => ChallengeStatus::Idle,
        }
    }
}

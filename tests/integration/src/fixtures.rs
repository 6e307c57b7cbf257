//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Registration request
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            username: format!("testuser{suffix}"),
            email: format!("test{suffix}@example.com"),
            password: "TestPass123!".to_string(),
        }
    }
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            username: reg.username.clone(),
            password: reg.password.clone(),
        }
    }
}

/// Token refresh request
#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Password change request
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Replacement code request for a pending two-factor login
#[derive(Debug, Serialize)]
pub struct RequestCodeRequest {
    pub two_factor_token: String,
}

/// Code verification request
#[derive(Debug, Serialize)]
pub struct VerifyCodeRequest {
    pub two_factor_token: String,
    pub two_factor_code: String,
}

/// Enable/disable two-factor request
#[derive(Debug, Serialize)]
pub struct ToggleTwoFactorRequest {
    pub enabled: bool,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor_code: Option<String>,
}

/// User resource as returned by register
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// User resource as returned by /auth/me
#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub two_factor_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Token pair response
#[derive(Debug, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login response when the account is two-factor gated
#[derive(Debug, Deserialize)]
pub struct PendingLoginResponse {
    pub two_factor_token: String,
    pub message: String,
}

/// Entry in the /auth/tokens listing
#[derive(Debug, Deserialize)]
pub struct TokenEntry {
    pub id: i64,
    pub expires_at: String,
}

/// /auth/tokens response
#[derive(Debug, Deserialize)]
pub struct TokenListResponse {
    pub tokens: Vec<TokenEntry>,
}

/// Plain acknowledgement response
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Session Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

/// User login request
///
/// Only presence is validated here; whether the pair is correct is decided by
/// the session service, which never distinguishes unknown user from wrong
/// password.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Password change request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub new_password: String,
}

// ============================================================================
// Two-Factor Requests
// ============================================================================

/// Request a fresh one-time code for a pending two-factor login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestCodeRequest {
    #[validate(length(min = 1, message = "Two-factor token is required"))]
    pub two_factor_token: String,
}

/// Submit a one-time code to complete a pending two-factor login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, message = "Two-factor token is required"))]
    pub two_factor_token: String,

    #[validate(length(min = 6, max = 6, message = "Code must be 6 digits"))]
    pub two_factor_code: String,
}

/// Enable or disable two-factor authentication
///
/// The current password is always required. A code is only consulted when
/// disabling while a challenge is still active.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ToggleTwoFactorRequest {
    pub enabled: bool,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub two_factor_code: Option<String>,
}

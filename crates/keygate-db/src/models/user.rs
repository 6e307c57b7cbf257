//! User database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Identity columns of the users table. The password hash is never selected
/// into this model; repositories fetch it separately when needed.
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Two-factor challenge columns of the users table
#[derive(Debug, Clone, FromRow)]
pub struct TwoFactorModel {
    pub two_factor_enabled: bool,
    pub two_factor_code: Option<String>,
    pub two_factor_expires_at: Option<DateTime<Utc>>,
    pub two_factor_client_ip: Option<String>,
    pub two_factor_user_agent: Option<String>,
    pub two_factor_last_requested_at: Option<DateTime<Utc>>,
    pub two_factor_request_attempts: i32,
    pub two_factor_verify_attempts: i32,
}

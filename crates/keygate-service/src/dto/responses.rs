//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output. Token and code
//! secrets never appear here except in the freshly issued pair itself.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// User Responses
// ============================================================================

/// Public user resource, returned from registration
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Current authenticated user, returned from `/auth/me`
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub two_factor_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Session Responses
// ============================================================================

/// Login deferred behind the second factor: the caller holds on to the
/// pending token and completes the session via the 2FA endpoints. The code
/// itself is delivered out-of-band and never appears in a response.
#[derive(Debug, Clone, Serialize)]
pub struct PendingTwoFactorResponse {
    pub two_factor_token: String,
    pub message: String,
}

impl PendingTwoFactorResponse {
    pub fn new(two_factor_token: String) -> Self {
        Self {
            two_factor_token,
            message: "Two-factor authentication required; a verification code has been sent"
                .to_string(),
        }
    }
}

/// Active access token metadata for the `/auth/tokens` listing.
/// Digests stay server-side; only the id and expiry are exposed.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    pub id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Wrapper for the `/auth/tokens` listing
#[derive(Debug, Serialize)]
pub struct TokenListResponse {
    pub tokens: Vec<AccessTokenResponse>,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Liveness plus dependency status for `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checks: HealthChecks,
}

/// Individual dependency probes
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: &'static str,
    pub redis: &'static str,
}

impl HealthResponse {
    pub fn new(database_up: bool, redis_up: bool) -> Self {
        let up = |ok: bool| if ok { "up" } else { "down" };
        Self {
            status: if database_up && redis_up {
                "ok"
            } else {
                "degraded"
            },
            checks: HealthChecks {
                database: up(database_up),
                redis: up(redis_up),
            },
        }
    }
}

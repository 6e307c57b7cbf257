//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use keygate_core::entities::{AccessTokenRecord, User};

use super::responses::{AccessTokenResponse, CurrentUserResponse, UserResponse};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.into_inner(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// A user together with their two-factor flag, which lives on a separate
/// state record and is joined in by the session service.
#[derive(Debug, Clone)]
pub struct UserWithTwoFactor {
    pub user: User,
    pub two_factor_enabled: bool,
}

impl From<&UserWithTwoFactor> for CurrentUserResponse {
    fn from(current: &UserWithTwoFactor) -> Self {
        Self {
            id: current.user.id.into_inner(),
            username: current.user.username.clone(),
            email: current.user.email.clone(),
            two_factor_enabled: current.two_factor_enabled,
            created_at: current.user.created_at,
            updated_at: current.user.updated_at,
        }
    }
}

impl From<UserWithTwoFactor> for CurrentUserResponse {
    fn from(current: UserWithTwoFactor) -> Self {
        Self::from(&current)
    }
}

// ============================================================================
// Token Mappers
// ============================================================================

impl From<&AccessTokenRecord> for AccessTokenResponse {
    fn from(record: &AccessTokenRecord) -> Self {
        Self {
            id: record.id,
            expires_at: record.expires_at,
        }
    }
}

impl From<AccessTokenRecord> for AccessTokenResponse {
    fn from(record: AccessTokenRecord) -> Self {
        Self::from(&record)
    }
}

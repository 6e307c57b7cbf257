//! User and two-factor model <-> entity mappers

use keygate_core::entities::{TwoFactorState, User};
use keygate_core::value_objects::UserId;

use crate::models::{TwoFactorModel, UserModel};

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::new(model.id),
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert TwoFactorModel to TwoFactorState snapshot
impl From<TwoFactorModel> for TwoFactorState {
    fn from(model: TwoFactorModel) -> Self {
        TwoFactorState {
            enabled: model.two_factor_enabled,
            code: model.two_factor_code,
            code_expires_at: model.two_factor_expires_at,
            client_ip: model.two_factor_client_ip,
            user_agent: model.two_factor_user_agent,
            last_requested_at: model.two_factor_last_requested_at,
            request_attempts: model.two_factor_request_attempts,
            verify_attempts: model.two_factor_verify_attempts,
        }
    }
}

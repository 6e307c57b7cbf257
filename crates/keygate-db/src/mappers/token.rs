//! Token model <-> entity mappers

use keygate_core::entities::{AccessTokenRecord, RefreshTokenRecord};
use keygate_core::value_objects::UserId;

use crate::models::{AccessTokenModel, RefreshTokenModel};

/// Convert AccessTokenModel to AccessTokenRecord entity
impl From<AccessTokenModel> for AccessTokenRecord {
    fn from(model: AccessTokenModel) -> Self {
        AccessTokenRecord {
            id: model.id,
            user_id: UserId::new(model.user_id),
            token_digest: model.token_digest,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

/// Convert RefreshTokenModel to RefreshTokenRecord entity
impl From<RefreshTokenModel> for RefreshTokenRecord {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshTokenRecord {
            id: model.id,
            user_id: UserId::new(model.user_id),
            token_hash: model.token_hash,
            used: model.used,
            revoked: model.revoked,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

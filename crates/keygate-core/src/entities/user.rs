//! User entity - represents an account that owns tokens and challenges

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// User account. The password hash never travels on this entity; repositories
/// hand it out separately so it cannot leak into responses or logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: UserId, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            created_at: now,
            updated_at: now,
        }
    }
}

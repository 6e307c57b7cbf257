//! # keygate-core
//!
//! Domain layer containing entities, value objects, repository traits, and
//! notification events. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AccessTokenRecord, ChallengeStatus, RefreshTokenRecord, TwoFactorState, User,
};
pub use error::DomainError;
pub use events::NotificationEvent;
pub use traits::{
    AccessTokenRepository, Notifier, PendingSessionStore, RefreshTokenRepository, RepoResult,
    TwoFactorRepository, UserRepository,
};
pub use value_objects::{UserId, UserIdParseError};

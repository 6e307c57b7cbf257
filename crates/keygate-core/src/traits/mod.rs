//! Port traits - interfaces the domain expects infrastructure to provide

mod repositories;

pub use repositories::{
    AccessTokenRepository, Notifier, PendingSessionStore, RefreshTokenRepository, RepoResult,
    TwoFactorRepository, UserRepository,
};

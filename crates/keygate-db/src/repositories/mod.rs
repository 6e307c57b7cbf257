//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in
//! keygate-core. Each repository handles database operations for one slice
//! of the credential store.

mod access_token;
mod error;
mod refresh_token;
mod two_factor;
mod user;

pub use access_token::PgAccessTokenRepository;
pub use refresh_token::PgRefreshTokenRepository;
pub use two_factor::PgTwoFactorRepository;
pub use user::PgUserRepository;

//! Domain entities - core business objects

mod access_token;
mod refresh_token;
mod two_factor;
mod user;

pub use access_token::AccessTokenRecord;
pub use refresh_token::RefreshTokenRecord;
pub use two_factor::{ChallengeStatus, TwoFactorState};
pub use user::User;

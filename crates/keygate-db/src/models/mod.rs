//! Database models - SQLx-compatible structs for PostgreSQL tables

mod access_token;
mod refresh_token;
mod user;

pub use access_token::AccessTokenModel;
pub use refresh_token::RefreshTokenModel;
pub use user::{TwoFactorModel, UserModel};

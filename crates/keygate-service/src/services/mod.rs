//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod access_token;
pub mod context;
pub mod error;
pub mod refresh_token;
pub mod session;
pub mod two_factor;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export all services for convenience
pub use access_token::AccessTokenService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use refresh_token::RefreshTokenService;
pub use session::{LoginOutcome, SessionService};
pub use two_factor::TwoFactorService;

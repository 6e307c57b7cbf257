//! # keygate-service
//!
//! Application layer containing business logic, services, and DTOs.

pub mod dto;
pub mod notifier;
pub mod services;

pub use notifier::LogNotifier;
pub use services::{
    AccessTokenService, LoginOutcome, RefreshTokenService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, SessionService, TwoFactorService,
};

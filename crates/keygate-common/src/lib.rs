//! # keygate-common
//!
//! Shared utilities for the keygate credential service:
//!
//! - **config**: environment-driven application configuration
//! - **error**: the application error type and HTTP mapping
//! - **auth**: password hashing and opaque token primitives
//! - **telemetry**: tracing/logging initialization

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export the most commonly used items
pub use auth::{
    digest_token, generate_numeric_code, generate_pending_handle, generate_secret,
    hash_password, hash_token_secret, validate_password_strength, verify_password,
    verify_token_secret, PasswordService, TokenPair, ACCESS_TOKEN_LENGTH,
    PENDING_HANDLE_LENGTH, REFRESH_TOKEN_LENGTH, TWO_FACTOR_CODE_DIGITS,
};
pub use config::{
    AppConfig, ConfigError, CorsConfig, DatabaseConfig, Environment, RateLimitConfig,
    RedisConfig, ServerConfig, TokenConfig, TwoFactorConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{init_tracing, init_tracing_with_config, TracingConfig};

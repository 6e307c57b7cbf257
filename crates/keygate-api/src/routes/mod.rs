//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, health, two_factor};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health, which is
/// mounted outside the rate-limited stack)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(two_factor_routes())
}

/// Session lifecycle routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_all))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/me", get(auth::current_user))
        .route("/auth/tokens", get(auth::list_tokens))
}

/// Two-factor routes
fn two_factor_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/2fa/request-code", post(two_factor::request_code))
        .route("/auth/2fa/verify-code", post(two_factor::verify_code))
        .route("/auth/2fa/toggle", post(two_factor::toggle))
}

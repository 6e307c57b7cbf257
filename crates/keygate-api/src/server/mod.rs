//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use keygate_cache::{RedisPendingSessionStore, RedisPool, RedisPoolConfig};
use keygate_common::{AppConfig, AppError};
use keygate_db::{
    create_pool, run_migrations, DatabaseConfig, PgAccessTokenRepository,
    PgRefreshTokenRepository, PgTwoFactorRepository, PgUserRepository,
};
use keygate_service::{LogNotifier, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// The API routes carry the full stack including the rate limiter; the
/// health endpoint only gets request IDs, tracing, and a timeout.
pub fn create_app(state: AppState) -> Router {
    let api = apply_middleware_with_config(create_router(), state.config());
    let health = apply_middleware(health_routes());
    api.merge(health).with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let db_config = DatabaseConfig::from_app_config(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Apply pending schema migrations
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("Database migrations applied");

    // Create Redis pool
    info!("Connecting to Redis...");
    let redis_config = RedisPoolConfig::from(&config.redis);
    let redis_pool = RedisPool::new(redis_config)
        .map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    // Pending two-factor logins live in Redis; everything else in Postgres
    let pending_sessions = Arc::new(RedisPendingSessionStore::new(redis_pool.clone()));
    let shared_redis = Arc::new(redis_pool);

    // Create repositories
    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let access_token_repo = Arc::new(PgAccessTokenRepository::new(pool.clone()));
    let refresh_token_repo = Arc::new(PgRefreshTokenRepository::new(pool.clone()));
    let two_factor_repo = Arc::new(PgTwoFactorRepository::new(pool.clone()));

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .access_token_repo(access_token_repo)
        .refresh_token_repo(refresh_token_repo)
        .two_factor_repo(two_factor_repo)
        .pending_sessions(pending_sessions)
        .notifier(Arc::new(LogNotifier::new()))
        .tokens(config.tokens.clone())
        .two_factor(config.two_factor.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, pool, shared_redis))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on http://{}", addr);

    // Connect info is required so the client IP fallback works without a proxy
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;

    // Create app state
    let state = create_app_state(config).await?;

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, addr).await
}

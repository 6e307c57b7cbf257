//! # keygate-cache
//!
//! Redis caching layer for pending two-factor login sessions.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pending Sessions**: handle → user bindings with automatic expiry,
//!   bridging the gap between password check and code verification
//!
//! ## Example
//!
//! ```ignore
//! use keygate_cache::{RedisPool, RedisPoolConfig, RedisPendingSessionStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let pending = RedisPendingSessionStore::new(pool.clone());
//!
//! pending.put("opaque-handle", user_id, 600).await?;
//! let user = pending.resolve("opaque-handle").await?;
//! ```

pub mod pool;
pub mod session;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export session types
pub use session::RedisPendingSessionStore;

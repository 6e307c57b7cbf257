mod app_config;

pub use app_config::{
    AppConfig, ConfigError, CorsConfig, DatabaseConfig, Environment, RateLimitConfig,
    RedisConfig, ServerConfig, TokenConfig, TwoFactorConfig,
};

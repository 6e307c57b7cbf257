//! Application configuration loaded from environment variables.
//!
//! Every knob has a sensible default except `DATABASE_URL` and `REDIS_URL`,
//! which must be provided. A `.env` file is honored when present.

use std::env;
use std::str::FromStr;

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Deployment environment the service runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    #[inline]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[inline]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub tokens: TokenConfig,
    pub two_factor: TwoFactorConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

/// HTTP server binding and timeouts.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl ServerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
}

/// Redis connection settings.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub pool_size: usize,
}

/// Lifetimes and limits for issued credentials.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access token lifetime in minutes.
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days.
    pub refresh_ttl_days: i64,
    /// Per-user ceiling on stored access tokens. Zero disables the cap.
    pub max_active_access_tokens: u32,
}

impl TokenConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_ttl_minutes)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_ttl_days)
    }

    /// Access token lifetime in seconds, as reported in token responses.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_minutes * 60
    }
}

/// Two-factor challenge lifetimes and throttling thresholds.
#[derive(Debug, Clone)]
pub struct TwoFactorConfig {
    /// Verification code lifetime in minutes.
    pub code_ttl_minutes: i64,
    /// Resend requests from the same client before the per-client delay kicks in.
    pub client_threshold: i32,
    /// Cooldown applied to a throttled client, in seconds.
    pub client_delay_seconds: i64,
    /// Resend requests from anywhere before the account-wide delay kicks in.
    pub global_threshold: i32,
    /// Cooldown applied account-wide, in seconds.
    pub global_delay_seconds: i64,
    /// Failed verifications before the active code is invalidated.
    pub max_verify_attempts: i32,
}

impl TwoFactorConfig {
    pub fn code_ttl(&self) -> Duration {
        Duration::minutes(self.code_ttl_minutes)
    }

    /// Pending login handles outlive the code so a fresh code can be requested
    /// against the same handle.
    pub fn pending_handle_ttl_seconds(&self) -> u64 {
        self.code_ttl_minutes.max(0) as u64 * 60 * 2
    }

    pub fn client_delay(&self) -> Duration {
        Duration::seconds(self.client_delay_seconds)
    }

    pub fn global_delay(&self) -> Duration {
        Duration::seconds(self.global_delay_seconds)
    }
}

/// Transport-level request rate limiting.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u64,
    pub burst_size: u32,
}

/// Cross-origin resource sharing.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allow_any(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present; ignore when absent.
        dotenvy::dotenv().ok();

        let environment = parse_var("APP_ENV", optional("APP_ENV", "development"))?;

        let server = ServerConfig {
            host: optional("SERVER_HOST", "127.0.0.1"),
            port: parse_var("SERVER_PORT", optional("SERVER_PORT", "8080"))?,
            request_timeout_seconds: parse_var(
                "REQUEST_TIMEOUT_SECONDS",
                optional("REQUEST_TIMEOUT_SECONDS", "30"),
            )?,
        };

        let database = DatabaseConfig {
            url: required("DATABASE_URL")?,
            max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                optional("DATABASE_MAX_CONNECTIONS", "10"),
            )?,
            min_connections: parse_var(
                "DATABASE_MIN_CONNECTIONS",
                optional("DATABASE_MIN_CONNECTIONS", "2"),
            )?,
            connect_timeout_seconds: parse_var(
                "DATABASE_CONNECT_TIMEOUT_SECONDS",
                optional("DATABASE_CONNECT_TIMEOUT_SECONDS", "5"),
            )?,
        };

        let redis = RedisConfig {
            url: required("REDIS_URL")?,
            pool_size: parse_var("REDIS_POOL_SIZE", optional("REDIS_POOL_SIZE", "16"))?,
        };

        let tokens = TokenConfig {
            access_ttl_minutes: parse_var(
                "ACCESS_TOKEN_TTL_MINUTES",
                optional("ACCESS_TOKEN_TTL_MINUTES", "60"),
            )?,
            refresh_ttl_days: parse_var(
                "REFRESH_TOKEN_TTL_DAYS",
                optional("REFRESH_TOKEN_TTL_DAYS", "7"),
            )?,
            max_active_access_tokens: parse_var(
                "MAX_ACTIVE_ACCESS_TOKENS",
                optional("MAX_ACTIVE_ACCESS_TOKENS", "5"),
            )?,
        };

        let two_factor = TwoFactorConfig {
            code_ttl_minutes: parse_var(
                "TWO_FACTOR_CODE_TTL_MINUTES",
                optional("TWO_FACTOR_CODE_TTL_MINUTES", "5"),
            )?,
            client_threshold: parse_var(
                "TWO_FACTOR_CLIENT_THRESHOLD",
                optional("TWO_FACTOR_CLIENT_THRESHOLD", "3"),
            )?,
            client_delay_seconds: parse_var(
                "TWO_FACTOR_CLIENT_DELAY_SECONDS",
                optional("TWO_FACTOR_CLIENT_DELAY_SECONDS", "30"),
            )?,
            global_threshold: parse_var(
                "TWO_FACTOR_GLOBAL_THRESHOLD",
                optional("TWO_FACTOR_GLOBAL_THRESHOLD", "5"),
            )?,
            global_delay_seconds: parse_var(
                "TWO_FACTOR_GLOBAL_DELAY_SECONDS",
                optional("TWO_FACTOR_GLOBAL_DELAY_SECONDS", "50"),
            )?,
            max_verify_attempts: parse_var(
                "TWO_FACTOR_MAX_VERIFY_ATTEMPTS",
                optional("TWO_FACTOR_MAX_VERIFY_ATTEMPTS", "5"),
            )?,
        };

        let rate_limit = RateLimitConfig {
            requests_per_second: parse_var(
                "RATE_LIMIT_PER_SECOND",
                optional("RATE_LIMIT_PER_SECOND", "10"),
            )?,
            burst_size: parse_var("RATE_LIMIT_BURST", optional("RATE_LIMIT_BURST", "20"))?,
        };

        let cors = CorsConfig {
            allowed_origins: optional("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        };

        Ok(Self {
            environment,
            server,
            database,
            redis,
            tokens,
            two_factor,
            rate_limit,
            cors,
        })
    }
}

// ===== Environment helpers =====

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
{
    raw.parse()
        .map_err(|_| ConfigError::InvalidValue { name, value: raw })
}

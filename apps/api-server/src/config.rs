//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quill_core::services::{DEFAULT_COVER_URL_TTL, LoginConfig};
use quill_infra::{JwtConfig, RateLimitConfig};

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Object storage settings.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub dir: PathBuf,
    pub bucket: String,
    pub signed_url_ttl: Duration,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for URLs handed to browsers, e.g. signed cover URLs.
    pub public_base_url: String,
    /// The only account allowed into the admin area.
    pub admin_email: String,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub storage: StorageSettings,
    pub login: LoginConfig,
    pub auth_rate_limit: RateLimitConfig,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_email = env::var("ADMIN_EMAIL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("ADMIN_EMAIL"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed("PORT", 8080);
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}"));

        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
        });

        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        if secret == DEFAULT_JWT_SECRET {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }

        Ok(Self {
            host,
            port,
            public_base_url,
            admin_email,
            #[cfg(feature = "postgres")]
            database,
            jwt: JwtConfig {
                secret,
                expiration_hours: parsed("JWT_EXPIRATION_HOURS", 24),
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "quill".to_string()),
            },
            storage: StorageSettings {
                dir: PathBuf::from(env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string())),
                bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "post-cover".to_string()),
                signed_url_ttl: Duration::from_secs(parsed(
                    "SIGNED_URL_TTL_SECS",
                    DEFAULT_COVER_URL_TTL.as_secs(),
                )),
            },
            login: LoginConfig {
                delay: Duration::from_millis(parsed("LOGIN_DELAY_MS", 1000)),
                cooldown: Duration::from_secs(parsed("LOGIN_COOLDOWN_SECS", 30)),
            },
            auth_rate_limit: RateLimitConfig {
                max_requests: parsed("AUTH_RATE_LIMIT_MAX_REQUESTS", 5),
                window: Duration::from_secs(parsed("AUTH_RATE_LIMIT_WINDOW_SECS", 60)),
            },
        })
    }

    /// In-memory configuration for handler tests.
    #[cfg(test)]
    pub fn for_tests(admin_email: &str, storage_dir: &std::path::Path) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_base_url: "http://localhost".to_string(),
            admin_email: admin_email.to_string(),
            #[cfg(feature = "postgres")]
            database: None,
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                expiration_hours: 1,
                issuer: "quill-test".to_string(),
            },
            storage: StorageSettings {
                dir: storage_dir.to_path_buf(),
                bucket: "post-cover".to_string(),
                signed_url_ttl: DEFAULT_COVER_URL_TTL,
            },
            login: LoginConfig {
                delay: Duration::ZERO,
                cooldown: Duration::from_secs(30),
            },
            auth_rate_limit: RateLimitConfig {
                max_requests: 100,
                window: Duration::from_secs(60),
            },
        }
    }
}

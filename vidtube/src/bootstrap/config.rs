//! Process configuration loaded from the environment (and `.env` via dotenvy).

use std::path::PathBuf;
use std::time::Duration;

use errors::AppError;

use crate::modules::feed::FeedLimits;
use crate::utils::env::{
    env_bool, env_duration_secs, env_i64, env_list, env_path, env_string, env_string_opt,
    env_u16, env_u32, env_u64,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub media: MediaConfig,
    pub feed: FeedLimits,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub logging_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub rest_port: u16,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_expiry_hours: i64,
    pub refresh_expiry_hours: i64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory holding stored objects, one subdirectory per media kind
    pub root: PathBuf,
    /// Prefix of every locator handed out by the store
    pub public_base_url: String,
    pub max_upload_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let secret = env_string_opt("JWT_SECRET")
            .ok_or_else(|| AppError::config("JWT_SECRET must be set"))?;

        let feed = FeedLimits {
            default_limit: env_u64("FEED_DEFAULT_LIMIT", 10),
            max_limit: env_u64("FEED_MAX_LIMIT", 100),
        };
        if feed.default_limit == 0 || feed.max_limit < feed.default_limit {
            return Err(AppError::config(format!(
                "FEED_DEFAULT_LIMIT ({}) must be between 1 and FEED_MAX_LIMIT ({})",
                feed.default_limit, feed.max_limit
            )));
        }

        Ok(Self {
            db: DbConfig {
                url: env_string("DATABASE_URL", "sqlite://vidtube.db?mode=rwc"),
                max_connections: env_u32("DB_MAX_CONNECTIONS", 20),
                min_connections: env_u32("DB_MIN_CONNECTIONS", 1),
                connect_timeout: env_duration_secs("DB_CONNECT_TIMEOUT_SECS", 8),
                idle_timeout: env_duration_secs("DB_IDLE_TIMEOUT_SECS", 600),
                max_lifetime: env_duration_secs("DB_MAX_LIFETIME_SECS", 1800),
                logging_enabled: env_bool("DB_LOGGING", false),
            },
            server: ServerConfig {
                host: env_string("REST_HOST", "0.0.0.0"),
                rest_port: env_u16("REST_PORT", 8080),
            },
            jwt: JwtConfig {
                secret,
                access_expiry_hours: env_i64("ACCESS_TOKEN_EXPIRY_HOURS", 1),
                refresh_expiry_hours: env_i64("REFRESH_TOKEN_EXPIRY_HOURS", 240),
            },
            cors: CorsConfig {
                allowed_origins: env_list("CORS_ALLOWED_ORIGINS", &["http://localhost:3000"]),
                allow_credentials: env_bool("CORS_ALLOW_CREDENTIALS", true),
            },
            media: MediaConfig {
                root: env_path("MEDIA_ROOT", "./media"),
                public_base_url: env_string("MEDIA_PUBLIC_BASE_URL", "http://localhost:8080/media"),
                max_upload_bytes: env_u64("MEDIA_MAX_UPLOAD_BYTES", 200 * 1024 * 1024),
            },
            feed,
        })
    }
}

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use bytes::Bytes;
use entity::video;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;
use uuid::Uuid;
use vidtube::api::platform::Platform;
use vidtube::api::servers::app_state::AppState;
use vidtube::api::servers::rest;
use vidtube::bootstrap::config::{
    Config, CorsConfig, DbConfig, JwtConfig, MediaConfig, ServerConfig,
};
use vidtube::modules::content::NewVideo;
use vidtube::modules::feed::FeedLimits;
use vidtube::modules::identity::{AccountDetails, NewAccount, Session, TokenSettings, jwt};
use vidtube::modules::media::LocalMediaStore;

pub const TEST_PASSWORD: &str = "password123";
pub const TEST_JWT_SECRET: &str = "test-secret-key";

/// Test server container with access to all components
pub struct TestServer {
    pub router: Router,
    pub platform: Platform,
    pub temp: TempDir,
}

pub fn create_test_config(temp: &TempDir) -> Config {
    Config {
        db: DbConfig {
            url: format!("sqlite://{}?mode=rwc", temp.path().join("test.db").display()),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
            logging_enabled: false,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            rest_port: 8080,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_expiry_hours: 1,
            refresh_expiry_hours: 240,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            allow_credentials: true,
        },
        media: MediaConfig {
            root: temp.path().join("media"),
            public_base_url: "http://localhost:8080/media".to_string(),
            max_upload_bytes: 1024 * 1024,
        },
        feed: FeedLimits::default(),
    }
}

/// Setup a test database with migrations
pub async fn setup_test_database(config: &Config) -> DatabaseConnection {
    let mut opt = ConnectOptions::new(&config.db.url);
    opt.max_connections(config.db.max_connections)
        .min_connections(config.db.min_connections)
        .sqlx_logging(false);

    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    db
}

/// A platform over a fresh sqlite database and media root.
pub async fn setup_test_platform() -> (Platform, TempDir) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&temp);
    let platform = build_platform(&config).await;
    (platform, temp)
}

/// Setup a test server with app state
pub async fn setup_test_server() -> TestServer {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&temp);
    let platform = build_platform(&config).await;

    let router = rest::build_router(AppState::new(platform.clone()), &config);

    TestServer {
        router,
        platform,
        temp,
    }
}

async fn build_platform(config: &Config) -> Platform {
    jwt::init_jwt_secret(TEST_JWT_SECRET);

    let db = setup_test_database(config).await;
    let media = Arc::new(LocalMediaStore::from_config(&config.media));
    let tokens = TokenSettings {
        access_expiry_hours: config.jwt.access_expiry_hours,
        refresh_expiry_hours: config.jwt.refresh_expiry_hours,
    };

    Platform::new(db, media, tokens, config.feed)
}

pub fn test_image() -> Bytes {
    Bytes::from(format!("image-{}", Uuid::new_v4()))
}

pub fn test_video_bytes() -> Bytes {
    Bytes::from(format!("video-{}", Uuid::new_v4()))
}

/// Register an account named `handle` with [`TEST_PASSWORD`].
pub async fn create_account(platform: &Platform, handle: &str) -> AccountDetails {
    platform
        .accounts()
        .register(NewAccount {
            handle: handle.to_string(),
            email: format!("{handle}@example.com"),
            display_name: format!("{handle} display"),
            password: TEST_PASSWORD.to_string(),
            avatar: test_image(),
            cover: None,
        })
        .await
        .expect("Failed to register test account")
}

pub async fn login(platform: &Platform, handle: &str) -> Session {
    platform
        .accounts()
        .login(handle, TEST_PASSWORD)
        .await
        .expect("Failed to log in test account")
}

/// Register `handle` and return its id with a bearer token.
pub async fn create_account_with_token(platform: &Platform, handle: &str) -> (Uuid, String) {
    let account = create_account(platform, handle).await;
    let session = login(platform, handle).await;
    (account.id, session.access_token)
}

/// Upload a video for `owner`, publishing it when `published` is set.
pub async fn create_video(
    platform: &Platform,
    owner: Uuid,
    title: &str,
    published: bool,
) -> video::Model {
    let video = platform
        .videos()
        .publish(
            owner,
            NewVideo {
                title: title.to_string(),
                description: format!("{title} description"),
                video: test_video_bytes(),
                thumbnail: test_image(),
            },
        )
        .await
        .expect("Failed to publish test video");

    if published {
        platform
            .videos()
            .toggle_publish(video.id, owner)
            .await
            .expect("Failed to toggle test video")
    } else {
        video
    }
}

pub fn set_env(key: &str, value: &str) {
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Remove multiple environment variables
pub fn remove_envs(keys: &[&str]) {
    for key in keys {
        unsafe {
            std::env::remove_var(key);
        }
    }
}

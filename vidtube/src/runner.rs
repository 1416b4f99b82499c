use std::sync::Arc;

use crate::{
    api::{
        platform::Platform,
        servers::{app_state::AppState, rest},
    },
    bootstrap::config::Config,
    modules::{
        identity::{TokenSettings, jwt},
        media::{LocalMediaStore, MediaKind, MediaStore},
    },
};
use errors::AppError;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use tracing::info;

pub async fn run() -> Result<(), AppError> {
    init_tracing();

    let config = Config::from_env()?;
    info!("Configuration loaded. Initializing platform...");

    jwt::init_jwt_secret(&config.jwt.secret);

    let (db_conn, media) = tokio::try_join!(setup_database(&config), setup_media_store(&config))?;
    let app_state = assemble_application(&config, db_conn, media);

    run_server(app_state, config).await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

async fn setup_database(config: &Config) -> Result<DatabaseConnection, AppError> {
    info!("Setting up Database");

    let db_config = &config.db;
    let mut opt = ConnectOptions::new(&db_config.url);

    opt.max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .connect_timeout(db_config.connect_timeout)
        .idle_timeout(db_config.idle_timeout)
        .max_lifetime(db_config.max_lifetime)
        .sqlx_logging(db_config.logging_enabled);

    let connection = sea_orm::Database::connect(opt)
        .await
        .map_err(|db_err| AppError::Storage(Box::new(db_err)))?;

    info!("Running database migrations...");
    Migrator::up(&connection, None)
        .await
        .map_err(|db_err| AppError::Migration(Box::new(db_err)))?;

    Ok(connection)
}

async fn setup_media_store(config: &Config) -> Result<Arc<dyn MediaStore>, AppError> {
    info!(root = %config.media.root.display(), "Setting up local media store");

    let store = LocalMediaStore::from_config(&config.media);
    for kind in [MediaKind::Video, MediaKind::Image] {
        tokio::fs::create_dir_all(store.root().join(kind.as_str()))
            .await
            .map_err(|e| AppError::Media(format!("Failed to prepare media root: {e}")))?;
    }

    Ok(Arc::new(store))
}

fn assemble_application(
    config: &Config,
    db_conn: DatabaseConnection,
    media: Arc<dyn MediaStore>,
) -> AppState {
    let tokens = TokenSettings {
        access_expiry_hours: config.jwt.access_expiry_hours,
        refresh_expiry_hours: config.jwt.refresh_expiry_hours,
    };
    let platform = Platform::new(db_conn, media, tokens, config.feed);
    AppState::new(platform)
}

async fn run_server(app_state: AppState, config: Config) -> Result<(), AppError> {
    info!("Starting server...");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    };

    rest::start(&app_state, &config, shutdown).await?;

    info!("Application shutdown complete.");
    Ok(())
}

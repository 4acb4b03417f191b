pub mod models;
pub mod test_utils;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use util::config;

/// Connects using the configured `DATABASE_PATH`.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    connect_to(&config::database_path()).await
}

/// Accepts either a full DSN or a bare SQLite file path.
pub async fn connect_to(path_or_url: &str) -> Result<DatabaseConnection, DbErr> {
    let url = if path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("mysql://")
    {
        path_or_url.to_owned()
    } else {
        // SQLite won't create intermediate dirs.
        if let Some(parent) = Path::new(path_or_url).parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(dir = %parent.display(), error = %err, "Could not create database directory");
            }
        }
        format!("sqlite://{path_or_url}?mode=rwc")
    };

    info!(%url, "Connecting to database");
    let mut options = ConnectOptions::new(url);
    options
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::config::DatabaseSettings;

const TOPICS_DB_FILENAME: &str = "topics.db";

/// Initialize the topics database, running migrations as needed.
///
/// `TOPICS_DB_PATH` takes precedence over the configured database directory.
pub async fn init_pool(settings: &DatabaseSettings) -> Result<(SqlitePool, PathBuf)> {
    let db_root = match std::env::var("TOPICS_DB_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => settings.path.clone().context(
            "database path must be configured or TOPICS_DB_PATH environment variable set",
        )?,
    };

    let db_root_path = normalize_path(db_root)?;
    std::fs::create_dir_all(&db_root_path)
        .with_context(|| format!("failed to create DB path: {}", db_root_path.display()))?;

    let topics_db_path = db_root_path.join(TOPICS_DB_FILENAME);
    let db_uri = format!("sqlite://{}", topics_db_path.to_string_lossy());

    let connect_options = SqliteConnectOptions::from_str(&db_uri)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Opened topics database at {}", topics_db_path.display());

    Ok((pool, db_root_path))
}

pub(crate) fn normalize_path<P: Into<PathBuf>>(path: P) -> Result<PathBuf> {
    let path = path.into();
    if path.is_absolute() {
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("failed to read current working directory")?;
    Ok(cwd.join(path))
}

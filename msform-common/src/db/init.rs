//! Database initialization
//!
//! Opens (or creates) the submission store and brings its schema up to date.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::PathBuf;
use tracing::info;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Initialize database connection and create tables if needed
///
/// Accepts `sqlite://<path>` (created on first use) or `sqlite::memory:`.
/// An in-memory database is held on a single connection so every query
/// sees the same data.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let pool = match database_file_path(database_url) {
        Some(db_path) => {
            let newly_created = !db_path.exists();

            // Create parent directory if it doesn't exist
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let db_url = if database_url.contains('?') {
                database_url.to_string()
            } else {
                format!("{}?mode=rwc", database_url)
            };
            let pool = SqlitePoolOptions::new()
                .max_connections(10)
                .connect(&db_url)
                .await?;

            if newly_created {
                info!("Initialized new database: {}", db_path.display());
            } else {
                info!("Opened existing database: {}", db_path.display());
            }

            // WAL lets list/get readers proceed while a submission is written
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await?;

            pool
        }
        None => {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await?;
            info!("Opened in-memory database");
            pool
        }
    };

    sqlx::query(&format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
        .execute(&pool)
        .await?;

    create_schema_version_table(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Filesystem path behind a sqlite URL, or `None` for in-memory databases
pub fn database_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" || rest.contains("mode=memory") {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

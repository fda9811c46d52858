//! Database access for docrisk-ai
//!
//! One SQLite file holding the `documents` table.

pub mod documents;

pub use documents::DocumentStore;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// SQLite busy_timeout applied to every connection
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Open (creating if missing) the database and ensure the schema exists
pub async fn init_database_pool(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }
    }

    tracing::debug!(path = %db_path.display(), "Connecting to database");

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    init_tables(&pool).await.context("Failed to initialize database schema")?;

    Ok(pool)
}

/// Create the `documents` table and its hash index if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            processed_at TEXT NOT NULL,
            risk_score REAL NOT NULL,
            risk_category TEXT NOT NULL,
            summary TEXT NOT NULL,
            document_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_hash ON documents(document_hash)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (documents)");

    Ok(())
}

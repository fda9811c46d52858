//! `documents` table operations
//!
//! Each operation is a single statement and therefore atomic; concurrent
//! workers never read-modify-write a row. Lock contention is retried with a
//! short capped backoff.

use docrisk_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::time::Duration;

use crate::models::DocumentRecord;
use crate::utils::{retry_with_backoff, RetryPolicy};

/// Persistent store for analysed documents
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
    lock_retry: RetryPolicy,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            lock_retry: RetryPolicy::exponential(8, Duration::from_millis(10))
                .with_max_delay(Duration::from_millis(1000)),
        }
    }

    /// True when any record with this hash is stored, failed analyses included
    ///
    /// Storage failures are logged and reported as "not found".
    pub async fn exists(&self, document_hash: &str) -> bool {
        match self.try_exists(document_hash).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(hash = %document_hash, error = %e, "DB check failed");
                false
            }
        }
    }

    pub async fn try_exists(&self, document_hash: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM documents WHERE document_hash = ? LIMIT 1",
        )
        .bind(document_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Insert or replace the record keyed by `id`
    pub async fn upsert(&self, record: &DocumentRecord) -> Result<()> {
        retry_with_backoff(
            "document upsert",
            &self.lock_retry,
            Error::is_database_locked,
            || async {
                sqlx::query(
                    r#"
                    INSERT INTO documents (
                        id, filename, processed_at, risk_score,
                        risk_category, summary, document_hash
                    ) VALUES (?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(id) DO UPDATE SET
                        filename = excluded.filename,
                        processed_at = excluded.processed_at,
                        risk_score = excluded.risk_score,
                        risk_category = excluded.risk_category,
                        summary = excluded.summary,
                        document_hash = excluded.document_hash
                    "#,
                )
                .bind(&record.id)
                .bind(&record.filename)
                .bind(&record.processed_at)
                .bind(record.risk_score)
                .bind(record.risk_category.as_str())
                .bind(&record.summary)
                .bind(&record.document_hash)
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(Error::Database)
            },
        )
        .await
        .map_err(|failure| failure.last_error)?;

        tracing::debug!(id = %record.id, hash = %record.document_hash, "Document record saved");
        Ok(())
    }

    /// Load a record by document id
    pub async fn get(&self, id: &str) -> Result<Option<DocumentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, filename, processed_at, risk_score, risk_category, summary, document_hash
            FROM documents
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let risk_category: String = row.get("risk_category");
                Ok(Some(DocumentRecord {
                    id: row.get("id"),
                    filename: row.get("filename"),
                    processed_at: row.get("processed_at"),
                    risk_score: row.get("risk_score"),
                    risk_category: risk_category.parse()?,
                    summary: row.get("summary"),
                    document_hash: row.get("document_hash"),
                }))
            }
            None => Ok(None),
        }
    }

    /// Number of stored records
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

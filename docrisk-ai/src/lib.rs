//! docrisk-ai library interface
//!
//! Watches a directory for legal documents, scores each section with a
//! remote sentiment classifier and writes a per-document risk report plus a
//! SQLite record. Exposes the building blocks for integration testing.

pub mod db;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::models::{DocumentAnalysis, DocumentRecord, RiskCategory, SectionAnalysis};
pub use crate::services::{DocumentPipeline, DocumentService, ProcessOutcome, RemoteSentimentClient, SentimentClassifier};
pub use crate::utils::WorkerPool;

use anyhow::{Context, Result};
use docrisk_common::AppConfig;
use std::sync::Arc;

/// Build the pipeline around an existing classifier
///
/// Opens the database at `config.db_path` and sizes the shared worker pool
/// from `config.max_workers`.
pub async fn build_pipeline(
    config: &AppConfig,
    classifier: Arc<dyn SentimentClassifier>,
) -> Result<DocumentPipeline> {
    let pool = WorkerPool::new(config.max_workers);
    let db = db::init_database_pool(&config.db_path, pool.size() as u32).await?;
    let store = db::DocumentStore::new(db);

    Ok(DocumentPipeline::new(config, classifier, store, pool))
}

/// Wire the full service with the remote classifier
pub async fn build_service(config: Arc<AppConfig>) -> Result<DocumentService> {
    let classifier =
        RemoteSentimentClient::from_config(&config).context("Failed to create sentiment client")?;
    let pipeline = build_pipeline(&config, Arc::new(classifier)).await?;

    Ok(DocumentService::new(config, Arc::new(pipeline)))
}

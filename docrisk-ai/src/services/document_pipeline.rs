//! Per-document analysis pipeline
//!
//! read → hash → dedup → split → dispatch sections → aggregate → persist → report
//!
//! The document task holds a worker slot only for its own I/O (read/hash/dedup,
//! then persist/report) and releases it while its sections run, so section
//! tasks drawing from the same pool can always make progress.

use docrisk_common::{AppConfig, Error, Result};
use std::path::Path;
use std::sync::Arc;

use crate::db::DocumentStore;
use crate::models::{DocumentAnalysis, DocumentRecord};
use crate::services::hash_deduplicator::{content_hash, HashDeduplicator, HashResult};
use crate::services::report_writer::ReportWriter;
use crate::services::risk_aggregator::RiskAggregator;
use crate::services::section_analyzer::SectionAnalyzer;
use crate::services::section_dispatcher::SectionDispatcher;
use crate::services::section_splitter::split_sections;
use crate::services::sentiment_client::SentimentClassifier;
use crate::utils::WorkerPool;

/// What happened to a submitted document
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Identical content was analysed before; nothing was done
    Duplicate { hash: String },
    /// Analysis ran (possibly yielding the failed result) and was persisted
    Analyzed(DocumentAnalysis),
}

pub struct DocumentPipeline {
    pool: WorkerPool,
    deduplicator: HashDeduplicator,
    dispatcher: SectionDispatcher,
    aggregator: RiskAggregator,
    store: DocumentStore,
    reports: ReportWriter,
}

impl DocumentPipeline {
    pub fn new(
        config: &AppConfig,
        classifier: Arc<dyn SentimentClassifier>,
        store: DocumentStore,
        pool: WorkerPool,
    ) -> Self {
        let analyzer = Arc::new(SectionAnalyzer::new(classifier, config.risk_weights.clone()));

        Self {
            deduplicator: HashDeduplicator::new(store.clone()),
            dispatcher: SectionDispatcher::new(analyzer, pool.clone()),
            aggregator: RiskAggregator::new(config.risk_thresholds),
            reports: ReportWriter::new(config.output_dir.clone()),
            store,
            pool,
        }
    }

    /// Split, analyse and aggregate raw text
    pub async fn analyze_text(&self, text: &str) -> DocumentAnalysis {
        let sections = split_sections(text);
        let section_count = sections.len();
        let analysed = self.dispatcher.dispatch(sections).await;

        let analysis = self.aggregator.aggregate(&analysed);
        if analysis.is_failed() {
            tracing::warn!(sections = section_count, "Analysis failed: no section produced a result");
        }
        analysis
    }

    /// Run the full pipeline for one file
    pub async fn process_document(&self, path: &Path) -> Result<ProcessOutcome> {
        let document_id = document_id(path);

        let (content, claim) = {
            let _permit = self.pool.acquire().await?;
            let content = read_document(path).await?;
            match self.deduplicator.check(&content_hash(&content)).await {
                HashResult::Duplicate { hash } => {
                    tracing::info!(path = %path.display(), "Skipping duplicate document");
                    return Ok(ProcessOutcome::Duplicate { hash });
                }
                HashResult::Unique(claim) => (content, claim),
            }
        };

        let analysis = self.analyze_text(&content).await;

        let _permit = self.pool.acquire().await?;
        let record = DocumentRecord::from_analysis(
            document_id.as_str(),
            path.display().to_string(),
            &analysis,
            claim.hash(),
        )?;
        if let Err(e) = self.store.upsert(&record).await {
            tracing::error!(path = %path.display(), error = %e, "DB save failed");
        }
        if let Err(e) = self.reports.write(&document_id, &analysis).await {
            tracing::error!(path = %path.display(), error = %e, "Report generation failed");
        }
        drop(claim);

        tracing::info!(
            path = %path.display(),
            risk_score = analysis.risk_score,
            risk_category = %analysis.risk_category,
            "Completed analysis"
        );
        Ok(ProcessOutcome::Analyzed(analysis))
    }

    /// Entry point for newly observed files; failures stay inside this document
    pub async fn handle_new_file(&self, path: &Path) {
        tracing::info!(path = %path.display(), "Processing");
        if let Err(e) = self.process_document(path).await {
            tracing::error!(path = %path.display(), error = %e, "Processing failed");
        }
    }

    pub fn worker_pool(&self) -> &WorkerPool {
        &self.pool
    }
}

/// Document id: the file name without its extension
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

async fn read_document(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes)
        .map_err(|_| Error::InvalidInput(format!("{} is not valid UTF-8 text", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_document_id_is_file_stem() {
        assert_eq!(document_id(&PathBuf::from("/docs/2026/nda-acme.txt")), "nda-acme");
        assert_eq!(document_id(&PathBuf::from("contract")), "contract");
        assert_eq!(document_id(&PathBuf::from("archive.tar.gz")), "archive.tar");
    }
}

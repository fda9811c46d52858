//! Analysis services
//!
//! Leaf-first: splitting, remote classification, per-section analysis,
//! concurrent dispatch, aggregation, deduplication, report output, and the
//! per-document pipeline and service lifecycle built on them.

pub mod document_pipeline;
pub mod document_service;
pub mod folder_watcher;
pub mod hash_deduplicator;
pub mod report_writer;
pub mod risk_aggregator;
pub mod section_analyzer;
pub mod section_dispatcher;
pub mod section_splitter;
pub mod sentiment_client;

pub use document_pipeline::{DocumentPipeline, ProcessOutcome};
pub use document_service::DocumentService;
pub use folder_watcher::FolderWatcher;
pub use hash_deduplicator::{content_hash, HashDeduplicator, HashResult};
pub use report_writer::ReportWriter;
pub use risk_aggregator::RiskAggregator;
pub use section_analyzer::SectionAnalyzer;
pub use section_dispatcher::SectionDispatcher;
pub use section_splitter::split_sections;
pub use sentiment_client::{ClassifierError, RemoteSentimentClient, SentimentClassifier};

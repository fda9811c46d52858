//! Data models for docrisk-ai
//!
//! Records produced along the pipeline: split sections, per-section
//! sentiment and risk, the per-document report and its persisted form.

pub mod document;
pub mod section;

pub use document::{AnalysisSummary, DocumentAnalysis, DocumentRecord, RiskCategory, ANALYSIS_FAILED};
pub use section::{Section, SectionAnalysis, SentimentLabel, SentimentResult};

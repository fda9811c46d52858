//! Document-level analysis and the persisted record

use docrisk_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Summary message for a document where no section could be analysed
pub const ANALYSIS_FAILED: &str = "Analysis failed";

/// Aggregate risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    /// No section produced a result
    Error,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::High => "high",
            RiskCategory::Error => "error",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(RiskCategory::Low),
            "medium" => Ok(RiskCategory::Medium),
            "high" => Ok(RiskCategory::High),
            "error" => Ok(RiskCategory::Error),
            other => Err(Error::InvalidInput(format!("Unknown risk category: {}", other))),
        }
    }
}

/// Counts for an analysed document, or the failure marker
///
/// Serialized untagged: `{"sections_analyzed": n, "total_keywords": m}` or
/// `{"error": "Analysis failed"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisSummary {
    Completed {
        sections_analyzed: usize,
        total_keywords: usize,
    },
    Failed {
        error: String,
    },
}

impl AnalysisSummary {
    pub fn sections_analyzed(&self) -> usize {
        match self {
            AnalysisSummary::Completed { sections_analyzed, .. } => *sections_analyzed,
            AnalysisSummary::Failed { .. } => 0,
        }
    }

    pub fn total_keywords(&self) -> usize {
        match self {
            AnalysisSummary::Completed { total_keywords, .. } => *total_keywords,
            AnalysisSummary::Failed { .. } => 0,
        }
    }
}

/// Per-document risk report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Mean section risk, rounded to two decimals
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub summary: AnalysisSummary,
    /// At most five high-risk sections
    pub key_findings: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl DocumentAnalysis {
    /// The canonical result for a document with no usable section results
    pub fn failed() -> Self {
        Self {
            risk_score: 0.0,
            risk_category: RiskCategory::Error,
            summary: AnalysisSummary::Failed {
                error: ANALYSIS_FAILED.to_string(),
            },
            key_findings: Vec::new(),
            risk_factors: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.risk_category == RiskCategory::Error
    }
}

/// Row in the `documents` table
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    /// File stem of the source document
    pub id: String,
    pub filename: String,
    /// RFC 3339 timestamp
    pub processed_at: String,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    /// JSON-serialized [`AnalysisSummary`]
    pub summary: String,
    /// SHA-256 of the raw text, lowercase hex
    pub document_hash: String,
}

impl DocumentRecord {
    pub fn from_analysis(
        id: impl Into<String>,
        filename: impl Into<String>,
        analysis: &DocumentAnalysis,
        document_hash: impl Into<String>,
    ) -> Result<Self> {
        let summary = serde_json::to_string(&analysis.summary)
            .map_err(|e| Error::Internal(format!("Failed to serialize summary: {}", e)))?;

        Ok(Self {
            id: id.into(),
            filename: filename.into(),
            processed_at: docrisk_common::time::now_iso8601(),
            risk_score: analysis.risk_score,
            risk_category: analysis.risk_category,
            summary,
            document_hash: document_hash.into(),
        })
    }

    /// Deserialize the stored summary column
    pub fn parsed_summary(&self) -> Result<AnalysisSummary> {
        serde_json::from_str(&self.summary)
            .map_err(|e| Error::Internal(format!("Failed to deserialize summary: {}", e)))
    }
}

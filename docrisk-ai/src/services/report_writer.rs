//! Markdown report output
//!
//! Writes `<output_dir>/<document_id>_report.md`.

use docrisk_common::Result;
use std::path::PathBuf;

use crate::models::DocumentAnalysis;

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn report_path(&self, document_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}_report.md", document_id))
    }

    /// Render and write the report, returning its path
    pub async fn write(&self, document_id: &str, analysis: &DocumentAnalysis) -> Result<PathBuf> {
        let path = self.report_path(document_id);
        let report = render_report(document_id, &docrisk_common::time::report_timestamp(), analysis);
        tokio::fs::write(&path, report).await?;
        tracing::debug!(path = %path.display(), "Report written");
        Ok(path)
    }
}

/// Markdown body for one document
pub fn render_report(document_id: &str, timestamp: &str, analysis: &DocumentAnalysis) -> String {
    let findings = bullet_list(&analysis.key_findings, "No critical findings");
    let factors = bullet_list(&analysis.risk_factors, "No significant risk factors detected");

    format!(
        "# Legal Risk Analysis Report\n\
         **Document ID**: {id}\n\
         **Date**: {timestamp}\n\
         **Risk Score**: {score:.2} ({category})\n\
         \n\
         ## Key Findings\n\
         {findings}\n\
         \n\
         ## Risk Factors\n\
         {factors}\n\
         \n\
         ## Analysis Summary\n\
         - Sections analyzed: {sections}\n\
         - Keywords detected: {keywords}\n",
        id = document_id,
        timestamp = timestamp,
        score = analysis.risk_score,
        category = analysis.risk_category.as_str().to_uppercase(),
        findings = findings,
        factors = factors,
        sections = analysis.summary.sections_analyzed(),
        keywords = analysis.summary.total_keywords(),
    )
}

fn bullet_list(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        return placeholder.to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

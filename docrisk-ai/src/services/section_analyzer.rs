//! Per-section sentiment, keyword and risk analysis

use docrisk_common::RiskWeights;
use std::sync::Arc;

use crate::models::{Section, SectionAnalysis, SentimentLabel, SentimentResult};
use crate::services::sentiment_client::SentimentClassifier;

/// Analyses a single section against the configured risk keywords
pub struct SectionAnalyzer {
    classifier: Arc<dyn SentimentClassifier>,
    risk_weights: RiskWeights,
}

impl SectionAnalyzer {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, risk_weights: RiskWeights) -> Self {
        Self {
            classifier,
            risk_weights,
        }
    }

    /// Classify and score one section
    ///
    /// Returns `None` when classification failed after all retries; the
    /// section is then left out of the document's analysis.
    pub async fn analyze(&self, section: &Section) -> Option<SectionAnalysis> {
        let sentiment = match self.classifier.classify(&section.content).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                tracing::error!(section = %section.title, error = %e, "Section analysis failed");
                return None;
            }
        };

        let keywords = detect_keywords(&section.content, &self.risk_weights);
        let risk_score = section_risk(&sentiment, &keywords, &self.risk_weights);

        tracing::debug!(
            section = %section.title,
            label = %sentiment.label,
            keywords = keywords.len(),
            risk_score,
            "Section analysed"
        );

        Some(SectionAnalysis {
            title: section.title.clone(),
            sentiment,
            keywords,
            risk_score,
        })
    }
}

/// Configured keywords occurring anywhere in `content`, ignoring case
///
/// Plain substring match: "legal" is found inside "illegally".
pub fn detect_keywords(content: &str, weights: &RiskWeights) -> Vec<String> {
    let content = content.to_lowercase();
    weights
        .iter()
        .filter(|(keyword, _)| content.contains(&keyword.to_lowercase()))
        .map(|(keyword, _)| keyword.to_string())
        .collect()
}

/// Risk implied by sentiment alone
pub fn base_risk(sentiment: &SentimentResult) -> f64 {
    match sentiment.label {
        SentimentLabel::Negative => sentiment.score,
        SentimentLabel::Positive => 1.0 - sentiment.score,
        SentimentLabel::Neutral | SentimentLabel::Error | SentimentLabel::Other(_) => 0.5 * (1.0 - sentiment.score),
    }
}

/// Sentiment risk compounded by keyword weights, clamped to [0, 1]
pub fn section_risk(sentiment: &SentimentResult, keywords: &[String], weights: &RiskWeights) -> f64 {
    let risk = keywords
        .iter()
        .fold(base_risk(sentiment), |risk, keyword| risk * weights.weight(keyword));

    if risk.is_nan() {
        0.0
    } else {
        risk.clamp(0.0, 1.0)
    }
}

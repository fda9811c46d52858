//! Section-level records

use serde::{Deserialize, Serialize};
use std::fmt;

/// A titled span of document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Sentiment label reported by the classifier
///
/// Labels outside the known set are kept verbatim so reports show what the
/// endpoint actually returned; they score like `neutral`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    /// No classification was attempted (zero retry budget)
    Error,
    Other(String),
}

impl SentimentLabel {
    /// Map a remote label, ignoring case for the known ones
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            "error" => SentimentLabel::Error,
            "neutral" => SentimentLabel::Neutral,
            _ => {
                tracing::debug!(label, "Unrecognised sentiment label, scoring as neutral");
                SentimentLabel::Other(label.to_string())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Error => "ERROR",
            SentimentLabel::Other(raw) => raw,
        }
    }
}

impl From<String> for SentimentLabel {
    fn from(label: String) -> Self {
        SentimentLabel::parse(&label)
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-scoring label for one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Confidence in [0, 1]
    pub score: f64,
}

impl SentimentResult {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self { label, score }
    }

    /// Placeholder result when no request was made
    pub fn error() -> Self {
        Self {
            label: SentimentLabel::Error,
            score: 0.0,
        }
    }
}

/// Derived risk signal for one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAnalysis {
    pub title: String,
    pub sentiment: SentimentResult,
    /// Detected keywords, in configured weight order
    pub keywords: Vec<String>,
    /// Clamped to [0, 1]
    pub risk_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(SentimentLabel::parse("Negative"), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::parse("POSITIVE"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::parse("neutral"), SentimentLabel::Neutral);
    }

    #[test]
    fn test_unknown_label_kept_verbatim() {
        let label = SentimentLabel::parse("LABEL_2");
        assert_eq!(label, SentimentLabel::Other("LABEL_2".to_string()));
        assert_eq!(label.to_string(), "LABEL_2");
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&SentimentLabel::Error).unwrap(), "\"ERROR\"");
        assert_eq!(serde_json::to_string(&SentimentLabel::Negative).unwrap(), "\"negative\"");
        let other: SentimentLabel = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(other, SentimentLabel::Other("mixed".to_string()));
    }
}

//! Document-level risk aggregation
//!
//! Mean of section risk scores, categorized against the configured
//! thresholds. Category and risk-factor choice use the unrounded mean; the
//! reported score is rounded to two decimals.

use docrisk_common::RiskThresholds;

use crate::models::{AnalysisSummary, DocumentAnalysis, RiskCategory, SectionAnalysis, SentimentLabel};

/// Most key findings listed per document
pub const MAX_KEY_FINDINGS: usize = 5;

pub struct RiskAggregator {
    thresholds: RiskThresholds,
}

impl RiskAggregator {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn categorize(&self, score: f64) -> RiskCategory {
        if score >= self.thresholds.high {
            RiskCategory::High
        } else if score >= self.thresholds.medium {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    /// Build the document report; an empty input yields [`DocumentAnalysis::failed`]
    pub fn aggregate(&self, sections: &[SectionAnalysis]) -> DocumentAnalysis {
        if sections.is_empty() {
            return DocumentAnalysis::failed();
        }

        let mean = sections.iter().map(|s| s.risk_score).sum::<f64>() / sections.len() as f64;
        let risk_category = self.categorize(mean);

        let key_findings = sections
            .iter()
            .filter(|s| s.risk_score >= self.thresholds.high)
            .take(MAX_KEY_FINDINGS)
            .map(|s| format!("{}: {} sentiment ({:.2})", s.title, s.sentiment.label, s.risk_score))
            .collect();

        let mut risk_factors = Vec::new();
        let negative_count = sections
            .iter()
            .filter(|s| s.sentiment.label == SentimentLabel::Negative)
            .count();
        if negative_count > 0 {
            risk_factors.push(format!("{} critical sections with negative sentiment", negative_count));
        }
        match risk_category {
            RiskCategory::High => risk_factors.push("Severe overall risk requiring immediate action".to_string()),
            RiskCategory::Medium => risk_factors.push("Elevated risk needing urgent review".to_string()),
            RiskCategory::Low | RiskCategory::Error => {}
        }

        DocumentAnalysis {
            risk_score: round2(mean),
            risk_category,
            summary: AnalysisSummary::Completed {
                sections_analyzed: sections.len(),
                total_keywords: sections.iter().map(|s| s.keywords.len()).sum(),
            },
            key_findings,
            risk_factors,
        }
    }
}

/// Two decimals, exact ties to the even digit (0.125 -> 0.12)
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        scaled.round_ties_even()
    } else {
        scaled.round()
    };
    rounded / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentResult;

    fn section(title: &str, label: SentimentLabel, score: f64, keywords: &[&str], risk: f64) -> SectionAnalysis {
        SectionAnalysis {
            title: title.to_string(),
            sentiment: SentimentResult::new(label, score),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            risk_score: risk,
        }
    }

    fn aggregator() -> RiskAggregator {
        RiskAggregator::new(RiskThresholds::default())
    }

    #[test]
    fn test_empty_input_is_canonical_error() {
        assert_eq!(aggregator().aggregate(&[]), DocumentAnalysis::failed());
    }

    #[test]
    fn test_single_high_risk_section() {
        let sections = [section("Liability", SentimentLabel::Negative, 0.9, &["legal"], 1.0)];
        let report = aggregator().aggregate(&sections);

        assert_eq!(report.risk_score, 1.0);
        assert_eq!(report.risk_category, RiskCategory::High);
        assert_eq!(report.key_findings, vec!["Liability: negative sentiment (1.00)"]);
        assert_eq!(
            report.risk_factors,
            vec![
                "1 critical sections with negative sentiment",
                "Severe overall risk requiring immediate action"
            ]
        );
        assert_eq!(
            report.summary,
            AnalysisSummary::Completed {
                sections_analyzed: 1,
                total_keywords: 1
            }
        );
    }

    #[test]
    fn test_two_neutral_sections_are_low() {
        let sections = [
            section("Introduction", SentimentLabel::Neutral, 0.5, &[], 0.25),
            section("Terms", SentimentLabel::Neutral, 0.5, &[], 0.25),
        ];
        let report = aggregator().aggregate(&sections);

        assert_eq!(report.risk_score, 0.25);
        assert_eq!(report.risk_category, RiskCategory::Low);
        assert!(report.key_findings.is_empty());
        assert!(report.risk_factors.is_empty());
    }

    #[test]
    fn test_medium_gets_elevated_factor() {
        let sections = [
            section("A", SentimentLabel::Positive, 0.4, &[], 0.6),
            section("B", SentimentLabel::Neutral, 0.2, &["financial"], 0.4),
        ];
        let report = aggregator().aggregate(&sections);

        assert_eq!(report.risk_category, RiskCategory::Medium);
        assert_eq!(report.risk_factors, vec!["Elevated risk needing urgent review"]);
    }

    #[test]
    fn test_key_findings_capped_at_five_in_order() {
        let sections: Vec<SectionAnalysis> = (1..=7)
            .map(|i| section(&format!("S{}", i), SentimentLabel::Negative, 0.8, &[], 0.8))
            .collect();
        let report = aggregator().aggregate(&sections);

        assert_eq!(report.key_findings.len(), MAX_KEY_FINDINGS);
        assert_eq!(report.key_findings[0], "S1: negative sentiment (0.80)");
        assert_eq!(report.key_findings[4], "S5: negative sentiment (0.80)");
        assert_eq!(report.risk_factors[0], "7 critical sections with negative sentiment");
    }

    #[test]
    fn test_score_rounded_but_category_uses_raw_mean() {
        // Mean 0.6966...: rounds to 0.7 but stays below the high threshold
        let sections = [
            section("A", SentimentLabel::Negative, 0.7, &[], 0.7),
            section("B", SentimentLabel::Negative, 0.7, &[], 0.7),
            section("C", SentimentLabel::Negative, 0.69, &[], 0.69),
        ];
        let report = aggregator().aggregate(&sections);

        assert_eq!(report.risk_score, 0.7);
        assert_eq!(report.risk_category, RiskCategory::Medium);
    }

    #[test]
    fn test_round2_ties_go_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(0.126), 0.13);
        assert_eq!(round2(0.6966), 0.7);
    }

    #[test]
    fn test_neutral_and_confident_positive_average_rounds_to_even() {
        // Risks 0.25 and 0.0: mean is exactly 0.125
        let sections = [
            section("Terms", SentimentLabel::Neutral, 0.5, &[], 0.25),
            section("Warranty", SentimentLabel::Positive, 1.0, &[], 0.0),
        ];
        let report = aggregator().aggregate(&sections);

        assert_eq!(report.risk_score, 0.12);
        assert_eq!(report.risk_category, RiskCategory::Low);
    }

    #[test]
    fn test_unknown_label_reported_verbatim() {
        let sections = [section(
            "Indemnity",
            SentimentLabel::Other("LABEL_0".to_string()),
            0.0,
            &[],
            0.9,
        )];
        let report = aggregator().aggregate(&sections);

        assert_eq!(report.key_findings, vec!["Indemnity: LABEL_0 sentiment (0.90)"]);
        assert_eq!(report.risk_factors, vec!["Severe overall risk requiring immediate action"]);
    }

    #[test]
    fn test_custom_thresholds() {
        let aggregator = RiskAggregator::new(RiskThresholds { high: 0.9, medium: 0.1 });
        assert_eq!(aggregator.categorize(0.85), RiskCategory::Medium);
        assert_eq!(aggregator.categorize(0.05), RiskCategory::Low);
        assert_eq!(aggregator.categorize(0.9), RiskCategory::High);
    }
}

//! Concurrent section dispatch
//!
//! Spawns one task per section; each task waits for a slot in the shared
//! [`WorkerPool`] before calling the analyzer. Results are collected as they
//! finish, then put back into section order so downstream slicing (the first
//! five key findings) is deterministic. A failed or panicked section is
//! simply absent from the output.

use std::sync::Arc;
use tokio::task::JoinSet;

use crate::models::{Section, SectionAnalysis};
use crate::services::section_analyzer::SectionAnalyzer;
use crate::utils::WorkerPool;

pub struct SectionDispatcher {
    analyzer: Arc<SectionAnalyzer>,
    pool: WorkerPool,
}

impl SectionDispatcher {
    pub fn new(analyzer: Arc<SectionAnalyzer>, pool: WorkerPool) -> Self {
        Self { analyzer, pool }
    }

    /// Analyse all sections concurrently, returning the successful ones in section order
    pub async fn dispatch(&self, sections: Vec<Section>) -> Vec<SectionAnalysis> {
        let total = sections.len();
        let mut join_set = JoinSet::new();

        for (index, section) in sections.into_iter().enumerate() {
            let analyzer = Arc::clone(&self.analyzer);
            let pool = self.pool.clone();

            join_set.spawn(async move {
                match pool.run(analyzer.analyze(&section)).await {
                    Ok(analysis) => (index, analysis),
                    Err(e) => {
                        tracing::error!(section = %section.title, error = %e, "Section could not be scheduled");
                        (index, None)
                    }
                }
            });
        }

        // Completion order
        let mut completed = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Some(analysis))) => completed.push((index, analysis)),
                Ok((_, None)) => {}
                Err(e) => tracing::error!(error = %e, "Section task panicked"),
            }
        }

        completed.sort_by_key(|(index, _)| *index);

        tracing::debug!(
            sections = total,
            analysed = completed.len(),
            failed = total - completed.len(),
            "Section dispatch complete"
        );

        completed.into_iter().map(|(_, analysis)| analysis).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SentimentLabel, SentimentResult};
    use crate::services::sentiment_client::{ClassifierError, SentimentClassifier};
    use async_trait::async_trait;
    use docrisk_common::RiskWeights;
    use std::time::Duration;

    /// Fails on content containing "FAIL"; sleeps for the number in the
    /// content (ms) so completion order differs from submission order.
    struct ScriptedClassifier;

    #[async_trait]
    impl SentimentClassifier for ScriptedClassifier {
        async fn classify(&self, text: &str) -> Result<SentimentResult, ClassifierError> {
            let delay: u64 = text
                .split_whitespace()
                .find_map(|w| w.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if text.contains("FAIL") {
                Err(ClassifierError::Status(503, "unavailable".to_string()))
            } else {
                Ok(SentimentResult::new(SentimentLabel::Negative, 0.8))
            }
        }
    }

    fn dispatcher(pool_size: usize) -> SectionDispatcher {
        let analyzer = SectionAnalyzer::new(Arc::new(ScriptedClassifier), RiskWeights::default());
        SectionDispatcher::new(Arc::new(analyzer), WorkerPool::new(pool_size))
    }

    #[tokio::test]
    async fn test_results_restored_to_section_order() {
        let sections = vec![
            Section::new("A", "slow 40\n"),
            Section::new("B", "medium 20\n"),
            Section::new("C", "fast 0\n"),
        ];

        let results = dispatcher(4).dispatch(sections).await;
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_failed_section_does_not_abort_siblings() {
        let sections = vec![
            Section::new("A", "ok 5\n"),
            Section::new("B", "FAIL 0\n"),
            Section::new("C", "ok 10\n"),
        ];

        let results = dispatcher(2).dispatch(sections).await;
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty() {
        let sections = vec![Section::new("A", "FAIL\n"), Section::new("B", "FAIL\n")];
        assert!(dispatcher(2).dispatch(sections).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_slot_pool_completes() {
        let sections = (0..5)
            .map(|i| Section::new(format!("S{}", i), "ok 1\n"))
            .collect();
        let dispatcher = dispatcher(1);
        assert_eq!(dispatcher.dispatch(sections).await.len(), 5);
        assert_eq!(dispatcher.pool.available(), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(dispatcher(1).dispatch(Vec::new()).await.is_empty());
    }
}

//! Remote sentiment classification
//!
//! POSTs `{"inputs": text}` with a bearer token to a text-classification
//! endpoint (FinBERT on the Hugging Face inference API by default) and keeps
//! the highest-scoring label.
//!
//! Every failure (timeout, connection error, non-2xx status, unexpected
//! payload) consumes one attempt of the retry budget. Input text is cut to
//! the first 2000 characters before sending.

use async_trait::async_trait;
use docrisk_common::AppConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{SentimentLabel, SentimentResult};
use crate::utils::{retry_with_backoff, RetryPolicy};

/// Longest input sent to the endpoint, in characters
pub const MAX_INPUT_CHARS: usize = 2000;

const USER_AGENT: &str = concat!("docrisk/", env!("CARGO_PKG_VERSION"));

/// Sentiment client errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Unexpected API response format: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Classification failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ClassifierError>,
    },
}

/// Anything that can label a piece of text
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SentimentResult, ClassifierError>;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// HTTP sentiment client with retry
pub struct RemoteSentimentClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_token: String,
    retry_policy: RetryPolicy,
}

impl RemoteSentimentClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: impl Into<String>,
        request_timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ClassifierError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_token: api_token.into(),
            retry_policy,
        })
    }

    /// Build from service configuration (`max_retries` attempts, `retry_backoff_ms` unit)
    pub fn from_config(config: &AppConfig) -> Result<Self, ClassifierError> {
        Self::new(
            config.api_url.clone(),
            config.api_token.clone(),
            config.request_timeout(),
            RetryPolicy::exponential(config.max_retries, config.retry_backoff()),
        )
    }

    async fn request_once(&self, text: &str) -> Result<SentimentResult, ClassifierError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&ClassifyRequest { inputs: text })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status(
                status.as_u16(),
                truncate_chars(&body, 200).to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let result = parse_response(&body)?;

        tracing::debug!(label = %result.label, score = result.score, "Sentiment classified");
        Ok(result)
    }
}

#[async_trait]
impl SentimentClassifier for RemoteSentimentClient {
    async fn classify(&self, text: &str) -> Result<SentimentResult, ClassifierError> {
        if self.retry_policy.max_attempts == 0 {
            return Ok(SentimentResult::error());
        }

        let input = truncate_chars(text, MAX_INPUT_CHARS);

        retry_with_backoff(
            "sentiment classification",
            &self.retry_policy,
            |_: &ClassifierError| true,
            || self.request_once(input),
        )
        .await
        .map_err(|failure| ClassifierError::RetriesExhausted {
            attempts: failure.attempts,
            last: Box::new(failure.last_error),
        })
    }
}

fn map_transport_error(e: reqwest::Error) -> ClassifierError {
    if e.is_timeout() {
        ClassifierError::Timeout(e.to_string())
    } else {
        ClassifierError::Network(e.to_string())
    }
}

/// Pick the top label from a `[[{label, score}, ...], ...]` payload
pub fn parse_response(body: &[u8]) -> Result<SentimentResult, ClassifierError> {
    let outer: Vec<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

    let first = outer
        .into_iter()
        .next()
        .ok_or_else(|| ClassifierError::MalformedResponse("empty result list".to_string()))?;

    let candidates: Vec<LabelScore> =
        serde_json::from_value(first).map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|top| SentimentResult::new(SentimentLabel::parse(&top.label), top.score))
        .ok_or_else(|| ClassifierError::MalformedResponse("no labels in first result".to_string()))
}

/// First `max_chars` characters of `text`, never splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_picks_max_score() {
        let body = br#"[[{"label":"positive","score":0.05},{"label":"negative","score":0.9},{"label":"neutral","score":0.05}]]"#;
        let result = parse_response(body).unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
        assert_eq!(result.score, 0.9);
    }

    #[test]
    fn test_parse_rejects_unexpected_shapes() {
        for body in [
            &b"{}"[..],
            b"[]",
            b"[[]]",
            br#"[{"label":"positive","score":0.9}]"#,
            b"not json",
        ] {
            assert!(
                matches!(parse_response(body), Err(ClassifierError::MalformedResponse(_))),
                "accepted {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("§§§§", 2), "§§");
        let long = "é".repeat(MAX_INPUT_CHARS + 10);
        assert_eq!(truncate_chars(&long, MAX_INPUT_CHARS).chars().count(), MAX_INPUT_CHARS);
    }

    #[tokio::test]
    async fn test_zero_retries_skips_request() {
        // Unroutable endpoint: any request would fail
        let client = RemoteSentimentClient::new(
            "http://127.0.0.1:9/never",
            "token",
            Duration::from_secs(1),
            RetryPolicy::exponential(0, Duration::from_millis(1)),
        )
        .unwrap();

        let result = client.classify("anything").await.unwrap();
        assert_eq!(result, SentimentResult::error());
    }
}

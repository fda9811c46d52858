//! Configuration loading
//!
//! The service reads a single TOML file at startup. Resolution order:
//! 1. Explicit path (command-line argument)
//! 2. `DOCRISK_CONFIG` environment variable
//! 3. `./docrisk.toml`
//! 4. `<config_dir>/docrisk/config.toml`
//!
//! A missing file is not an error: the built-in defaults apply. A file that
//! cannot be parsed is logged and the defaults apply in full. Keys absent from
//! a valid file take their individual defaults.

use crate::{Error, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Default sentiment model endpoint
pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models/ProsusAI/finbert";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "docrisk.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "DOCRISK_CONFIG";

/// Environment variable overriding `api_token`
pub const API_TOKEN_ENV_VAR: &str = "DOCRISK_API_TOKEN";

/// Service configuration, immutable after startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bearer token for the sentiment endpoint
    pub api_token: String,
    /// Sentiment endpoint URL
    pub api_url: String,
    /// Directory watched (recursively) for new documents
    pub watch_dir: PathBuf,
    /// Directory receiving `<id>_report.md` files
    pub output_dir: PathBuf,
    /// SQLite database file
    pub db_path: PathBuf,
    /// Size of the shared worker pool (documents and sections)
    pub max_workers: usize,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
    /// Total classification attempts per section
    pub max_retries: u32,
    /// Backoff unit in milliseconds; the Nth retry waits `2^(N-1)` units
    pub retry_backoff_ms: u64,
    /// Quiet period after the last write before a new file is analysed
    pub file_settle_ms: u64,
    /// Keyword multipliers, applied in the order written
    pub risk_weights: RiskWeights,
    pub risk_thresholds: RiskThresholds,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            watch_dir: PathBuf::from("./docs"),
            output_dir: PathBuf::from("./reports"),
            db_path: PathBuf::from("legal_analyses.db"),
            max_workers: 4,
            request_timeout: 30,
            max_retries: 5,
            retry_backoff_ms: 1000,
            file_settle_ms: 500,
            risk_weights: RiskWeights::default(),
            risk_thresholds: RiskThresholds::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Category boundaries for aggregate risk scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.4,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level (overridden by `RUST_LOG`)
    pub level: String,
    /// Optional log file, written in addition to stdout
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some(PathBuf::from("legal_analysis.log")),
        }
    }
}

/// Ordered keyword → multiplier mapping
///
/// Stored as a list so the multiplication order follows the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskWeights(Vec<(String, f64)>);

impl RiskWeights {
    pub fn new(weights: Vec<(String, f64)>) -> Self {
        Self(weights)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, w)| (k.as_str(), *w))
    }

    /// Weight for a keyword, 1.0 when not configured
    pub fn weight(&self, keyword: &str) -> f64 {
        self.0
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, w)| *w)
            .unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self(vec![
            ("legal".to_string(), 1.5),
            ("financial".to_string(), 1.4),
            ("reputation".to_string(), 1.3),
            ("operational".to_string(), 1.2),
        ])
    }
}

impl Serialize for RiskWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, w)| (k, w)))
    }
}

impl<'de> Deserialize<'de> for RiskWeights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct WeightsVisitor;

        impl<'de> Visitor<'de> for WeightsVisitor {
            type Value = RiskWeights;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of keyword = weight")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut weights = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((keyword, weight)) = map.next_entry::<String, f64>()? {
                    weights.push((keyword, weight));
                }
                Ok(RiskWeights(weights))
            }
        }

        deserializer.deserialize_map(WeightsVisitor)
    }
}

impl AppConfig {
    /// Resolve, read and finalize configuration. Never fails.
    pub fn load(cli_path: Option<&Path>) -> Self {
        let path = resolve_config_path(cli_path);
        let mut config = Self::load_from(path.as_deref());
        config.apply_env_overrides();
        config
    }

    /// Read configuration from `path`, falling back to defaults
    pub fn load_from(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            info!("No configuration file found, using built-in defaults");
            return Self::default();
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file unreadable, using built-in defaults");
                return Self::default();
            }
        };

        match Self::from_toml_str(&content) {
            Ok(config) => {
                info!(path = %path.display(), "Configuration loaded");
                config
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Config error, using built-in defaults");
                Self::default()
            }
        }
    }

    /// Parse TOML content and normalize out-of-range values
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        Ok(config.normalized())
    }

    /// `DOCRISK_API_TOKEN` wins over the file when set and non-blank
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(API_TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                info!("API token loaded from environment variable");
                self.api_token = token;
            }
        }
    }

    fn normalized(mut self) -> Self {
        if self.max_workers == 0 {
            warn!("max_workers = 0 is not usable, using 1");
            self.max_workers = 1;
        }
        if self.risk_thresholds.medium > self.risk_thresholds.high {
            warn!(
                high = self.risk_thresholds.high,
                medium = self.risk_thresholds.medium,
                "Medium risk threshold exceeds high threshold; 'medium' will never be assigned"
            );
        }
        self
    }

    /// Create the watch and output directories (and the database parent) if missing
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.watch_dir, &self.output_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::Config(format!("Cannot create directory {}: {}", dir.display(), e))
            })?;
        }
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if self.api_token.trim().is_empty() {
            warn!("api_token is empty; the sentiment endpoint will likely reject requests");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn file_settle_delay(&self) -> Duration {
        Duration::from_millis(self.file_settle_ms)
    }
}

/// Locate the config file following the documented priority order
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|d| d.join("docrisk").join("config.toml"))
        .filter(|p| p.exists())
}

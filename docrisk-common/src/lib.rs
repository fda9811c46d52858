//! # docrisk Common Library
//!
//! Shared code for the docrisk services:
//! - Error and result types
//! - Configuration model and TOML loading with built-in defaults
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use config::{AppConfig, LoggingConfig, RiskThresholds, RiskWeights};
pub use error::{Error, Result};

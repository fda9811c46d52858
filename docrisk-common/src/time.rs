//! Timestamp utilities

use chrono::{DateTime, Local, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO-8601 timestamp used for `processed_at` columns
pub fn now_iso8601() -> String {
    now().to_rfc3339()
}

/// Human-readable local timestamp used in reports (`YYYY-MM-DD HH:MM:SS`)
pub fn report_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

//! Common error types for docrisk

use thiserror::Error;

/// Common result type for docrisk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across docrisk crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input, e.g. a document that is not valid UTF-8
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for SQLite "database is locked" / "busy" failures, which are worth retrying
    pub fn is_database_locked(&self) -> bool {
        match self {
            Error::Database(err) => {
                let msg = err.to_string();
                msg.contains("database is locked") || msg.contains("database is busy")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_lock_errors() {
        assert!(!Error::Internal("database is locked".to_string()).is_database_locked());
        assert!(!Error::Config("bad".to_string()).is_database_locked());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing"));
    }
}

//! Utility modules for docrisk-ai

pub mod retry;
pub mod worker_pool;

pub use retry::{retry_with_backoff, RetryFailure, RetryPolicy};
pub use worker_pool::WorkerPool;

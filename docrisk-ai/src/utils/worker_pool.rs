//! Shared worker budget
//!
//! One pool bounds both document-level and section-level work. The same
//! handle is cloned into the document service and the section dispatcher, so
//! a burst of documents competes with sections for the same slots.

use docrisk_common::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed number of concurrent execution slots
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a pool with `size` slots (at least one)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots not currently held
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free slot; it is released when the permit is dropped
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Internal("Worker pool closed".to_string()))
    }

    /// Run `task` while holding one slot
    pub async fn run<F: Future>(&self, task: F) -> Result<F::Output> {
        let _permit = self.acquire().await?;
        Ok(task.await)
    }
}

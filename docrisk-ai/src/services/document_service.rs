//! Service lifecycle
//!
//! Watches the configured directory and spawns one document task per new
//! file once it has gone `file_settle_ms` without further writes. Shutdown
//! submits files still settling, stops accepting paths, waits for every
//! in-flight document to finish, then stops the watcher.

use docrisk_common::{AppConfig, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::time::{delay_queue, DelayQueue};
use walkdir::WalkDir;

use crate::services::document_pipeline::DocumentPipeline;
use crate::services::folder_watcher::{FileEvent, FolderWatcher};

pub struct DocumentService {
    config: Arc<AppConfig>,
    pipeline: Arc<DocumentPipeline>,
    tracker: TaskTracker,
}

impl DocumentService {
    pub fn new(config: Arc<AppConfig>, pipeline: Arc<DocumentPipeline>) -> Self {
        Self {
            config,
            pipeline,
            tracker: TaskTracker::new(),
        }
    }

    /// Queue one document for processing
    pub fn submit(&self, path: PathBuf) {
        let pipeline = Arc::clone(&self.pipeline);
        self.tracker.spawn(async move {
            pipeline.handle_new_file(&path).await;
        });
    }

    /// Queue every file already present under the watch directory
    pub fn submit_existing(&self) -> usize {
        let mut submitted = 0;
        let walker = WalkDir::new(&self.config.watch_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    self.submit(entry.into_path());
                    submitted += 1;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Error accessing entry"),
            }
        }

        tracing::info!(count = submitted, dir = %self.config.watch_dir.display(), "Queued existing documents");
        submitted
    }

    /// Number of document tasks still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait for all queued documents
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Watch until `shutdown` fires, then drain and stop
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let (watcher, mut events) = FolderWatcher::start(&self.config.watch_dir)?;
        tracing::info!(dir = %self.config.watch_dir.display(), "Started monitoring");

        let settle = self.config.file_settle_delay();
        let mut settling: DelayQueue<PathBuf> = DelayQueue::new();
        let mut pending: HashMap<PathBuf, delay_queue::Key> = HashMap::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(FileEvent::Created(path)) => match pending.get(&path) {
                        Some(key) => settling.reset(key, settle),
                        None => {
                            let key = settling.insert(path.clone(), settle);
                            pending.insert(path, key);
                        }
                    },
                    // Writes only delay files already waiting; edits to old files are ignored
                    Some(FileEvent::Written(path)) => {
                        if let Some(key) = pending.get(&path) {
                            settling.reset(key, settle);
                        }
                    }
                    None => {
                        tracing::warn!("File watcher channel closed");
                        break;
                    }
                },
                Some(expired) = std::future::poll_fn(|cx| settling.poll_expired(cx)), if !pending.is_empty() => {
                    let path = expired.into_inner();
                    pending.remove(&path);
                    self.submit(path);
                }
            }
        }

        for (path, _) in pending.drain() {
            self.submit(path);
        }
        settling.clear();

        tracing::info!(in_flight = self.in_flight(), "Shutdown requested, waiting for in-flight documents");
        self.drain().await;
        watcher.stop();
        tracing::info!("System shutdown complete");

        Ok(())
    }
}

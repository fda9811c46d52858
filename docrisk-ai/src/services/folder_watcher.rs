//! Recursive directory watching
//!
//! Forwards file events (never directories) over a tokio channel. Creation
//! announces a new document; later writes to the same path let the service
//! wait until the file has settled. The watcher stops when dropped.

use docrisk_common::{Error, Result};
use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// File-level event relevant to document intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// A new file appeared
    Created(PathBuf),
    /// An existing file's content changed or a writer closed it
    Written(PathBuf),
}

pub struct FolderWatcher {
    watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FolderWatcher {
    /// Start watching `root` recursively
    pub fn start(root: &Path) -> Result<(Self, mpsc::UnboundedReceiver<FileEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for file_event in file_events(&event) {
                    // Receiver gone means the service is shutting down
                    let _ = tx.send(file_event);
                }
            }
            Err(e) => tracing::warn!(error = %e, "File watch error"),
        })
        .map_err(|e| Error::Internal(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| Error::Internal(format!("Failed to watch {}: {}", root.display(), e)))?;

        Ok((
            Self {
                watcher,
                root: root.to_path_buf(),
            },
            rx,
        ))
    }

    /// Stop watching and release the OS handles
    pub fn stop(mut self) {
        if let Err(e) = self.watcher.unwatch(&self.root) {
            tracing::debug!(error = %e, "Unwatch failed");
        }
        tracing::info!(root = %self.root.display(), "Stopped monitoring");
    }
}

/// File events carried by a raw watcher event
pub fn file_events(event: &Event) -> Vec<FileEvent> {
    let files = event.paths.iter().filter(|p| !p.is_dir()).cloned();
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => files.map(FileEvent::Created).collect(),
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Access(AccessKind::Close(AccessMode::Write)) => {
            files.map(FileEvent::Written).collect()
        }
        _ => Vec::new(),
    }
}

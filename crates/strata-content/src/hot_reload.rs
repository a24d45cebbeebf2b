//! File watching for in-place reloads during development.
//!
//! [`ContentWatcher`] collects changed paths from `notify`;
//! [`Content::apply_changes`](crate::Content::apply_changes) maps them to
//! cached entries and reloads those.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, channel};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches directories and reports files that were written.
pub struct ContentWatcher {
    watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
    watched_dirs: Vec<PathBuf>,
}

impl ContentWatcher {
    pub fn new() -> Result<Self, notify::Error> {
        let (sender, receiver) = channel();

        let watcher = notify::recommended_watcher(move |res| {
            let _ = sender.send(res);
        })?;

        Ok(Self {
            watcher,
            receiver,
            watched_dirs: Vec::new(),
        })
    }

    /// Watch `path` recursively. Watching a directory twice is a no-op.
    pub fn watch_directory(&mut self, path: impl AsRef<Path>) -> Result<(), notify::Error> {
        let path = path.as_ref();

        if !self.watched_dirs.iter().any(|dir| dir == path) {
            self.watcher.watch(path, RecursiveMode::Recursive)?;
            self.watched_dirs.push(path.to_path_buf());
            tracing::debug!("Watching directory for changes: {}", path.display());
        }

        Ok(())
    }

    pub fn watched_directories(&self) -> &[PathBuf] {
        &self.watched_dirs
    }

    /// Drain pending events into the distinct paths created or modified since
    /// the last poll.
    pub fn poll_changes(&mut self) -> Vec<PathBuf> {
        let mut changed: Vec<PathBuf> = Vec::new();

        while let Ok(event) = self.receiver.try_recv() {
            match event {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        continue;
                    }
                    for path in event.paths {
                        if !changed.contains(&path) {
                            tracing::debug!("File changed: {}", path.display());
                            changed.push(path);
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("File watcher error: {}", e);
                }
            }
        }

        changed
    }
}

impl std::fmt::Debug for ContentWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentWatcher")
            .field("watched_dirs", &self.watched_dirs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_watch_same_directory_twice() {
        let temp_dir = TempDir::new().unwrap();
        let mut watcher = ContentWatcher::new().unwrap();

        watcher.watch_directory(temp_dir.path()).unwrap();
        watcher.watch_directory(temp_dir.path()).unwrap();

        assert_eq!(watcher.watched_directories().len(), 1);
    }

    #[test]
    fn test_poll_changes_no_events() {
        let mut watcher = ContentWatcher::new().unwrap();
        assert!(watcher.poll_changes().is_empty());
    }

    #[test]
    fn test_poll_changes_deduplicates() {
        let temp_dir = TempDir::new().unwrap();
        let mut watcher = ContentWatcher::new().unwrap();
        watcher.watch_directory(temp_dir.path()).unwrap();

        let file_path = temp_dir.path().join("Sky.ast");
        fs::write(&file_path, "initial").unwrap();
        thread::sleep(Duration::from_millis(100));
        let _ = watcher.poll_changes();

        fs::write(&file_path, "modified 1").unwrap();
        fs::write(&file_path, "modified 2").unwrap();
        thread::sleep(Duration::from_millis(200));

        let changes = watcher.poll_changes();
        assert!(changes.len() <= 1, "Expected at most 1 path, got {}", changes.len());
    }
}

//! File system watcher with debouncing for watch-mode rebuilds.
//!
//! Watches the project directory and filters changes to relevant files,
//! ignoring node_modules, build output, and other configured patterns.

use crate::error::{CliError, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// File change event type.
#[derive(Debug, Clone)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// File watcher with debouncing and filtering.
///
/// Dropping the watcher stops the underlying notify watcher and closes the
/// change channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
    debounce: Duration,
}

impl FileWatcher {
    /// Watch `root` recursively.
    ///
    /// Returns the watcher and a receiver for change events.
    ///
    /// # Errors
    ///
    /// Returns error if the directory doesn't exist or the watcher cannot be
    /// created.
    pub fn new(
        root: PathBuf,
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.exists() {
            return Err(CliError::FileNotFound(root));
        }
        // notify reports absolute paths
        let root = root.canonicalize()?;

        let (tx, rx) = mpsc::channel(100);

        let debounce = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            for path in &event.paths {
                if Self::should_ignore(path, &root_clone, &ignore_patterns) {
                    continue;
                }

                // Same file within the debounce window
                let now = Instant::now();
                if let Some((last_path, last_time)) = &last_event {
                    if last_path == path && now.duration_since(*last_time) < debounce {
                        continue;
                    }
                }
                last_event = Some((path.clone(), now));

                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                let _ = tx.blocking_send(change);
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
                debounce,
            },
            rx,
        ))
    }

    /// Wait for the next change, then keep absorbing changes until the
    /// debounce window passes quietly. Returns the batch, or `None` once the
    /// channel is closed.
    pub async fn next_batch(&self, changes: &mut mpsc::Receiver<FileChange>) -> Option<Vec<FileChange>> {
        let first = changes.recv().await?;
        let mut batch = vec![first];
        loop {
            match tokio::time::timeout(self.debounce, changes.recv()).await {
                Ok(Some(change)) => batch.push(change),
                Ok(None) | Err(_) => return Some(batch),
            }
        }
    }

    fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
        let Ok(rel_path) = path.strip_prefix(root) else {
            return true;
        };

        let path_str = rel_path.to_string_lossy();

        for pattern in ignore_patterns {
            if let Some(ext) = pattern.strip_prefix('*') {
                if path_str.ends_with(ext) {
                    return true;
                }
            } else if rel_path.components().any(|c| c.as_os_str() == pattern.as_str()) {
                return true;
            }
        }

        // Hidden files and directories
        rel_path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
        })
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_ignore_node_modules() {
        let root = PathBuf::from("/project");
        let patterns = vec!["node_modules".to_string()];

        let path = PathBuf::from("/project/node_modules/package/index.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));

        let path = PathBuf::from("/project/src/index.js");
        assert!(!FileWatcher::should_ignore(&path, &root, &patterns));
    }

    #[test]
    fn test_should_ignore_build_output_but_not_prefix_lookalikes() {
        let root = PathBuf::from("/project");
        let patterns = vec!["build".to_string()];

        let path = PathBuf::from("/project/build/public/main.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));

        let path = PathBuf::from("/project/src/builders.js");
        assert!(!FileWatcher::should_ignore(&path, &root, &patterns));
    }

    #[test]
    fn test_should_ignore_extension() {
        let root = PathBuf::from("/project");
        let patterns = vec!["*.compiledtest".to_string()];

        let path = PathBuf::from("/project/out/a.compiledtest");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns));
    }

    #[test]
    fn test_should_ignore_hidden_and_outside_root() {
        let root = PathBuf::from("/project");

        assert!(FileWatcher::should_ignore(&PathBuf::from("/project/.test/a.compiledtest"), &root, &[]));
        assert!(FileWatcher::should_ignore(&PathBuf::from("/other/file.js"), &root, &[]));
    }

    #[tokio::test]
    async fn test_next_batch_collects_burst() {
        let dir = tempfile::TempDir::new().unwrap();
        let (watcher, _rx) = FileWatcher::new(dir.path().to_path_buf(), vec![], 20).unwrap();

        let (tx, mut rx) = mpsc::channel(10);
        tx.send(FileChange::Modified(PathBuf::from("a.js"))).await.unwrap();
        tx.send(FileChange::Created(PathBuf::from("b.js"))).await.unwrap();

        let batch = watcher.next_batch(&mut rx).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].path(), Path::new("b.js"));

        drop(tx);
        assert!(watcher.next_batch(&mut rx).await.is_none());
    }
}

//! [`Watcher`] implementation backed by the `notify` crate.

use super::{WatchStreams, Watcher};
use crate::error::{ConfigError, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Path, PathBuf};

/// Filesystem watcher built on `notify::RecommendedWatcher`.
///
/// Events and errors from the OS backend are forwarded onto the streams
/// returned by [`Watcher::take_streams`]. Closing the watcher drops the
/// backend, which closes both streams.
///
/// # Examples
///
/// ```rust,no_run
/// use hotreload_config::watch::{NotifyWatcher, Watcher};
/// use std::path::Path;
///
/// # fn example() -> hotreload_config::error::Result<()> {
/// let mut watcher = NotifyWatcher::new()?;
/// watcher.add(Path::new("/etc/app/config.yaml"))?;
/// let streams = watcher.take_streams().expect("streams are taken once");
/// # Ok(())
/// # }
/// ```
pub struct NotifyWatcher {
    inner: Option<RecommendedWatcher>,
    streams: Option<WatchStreams>,
    watched_paths: Vec<PathBuf>,
}

impl NotifyWatcher {
    /// Create a new watcher with no paths registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS watch backend cannot be created.
    pub fn new() -> Result<Self> {
        let (event_tx, error_tx, streams) = WatchStreams::channel();

        let inner = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(e) => {
                let _ = error_tx.send(ConfigError::from(e));
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        Ok(Self {
            inner: Some(inner),
            streams: Some(streams),
            watched_paths: Vec::new(),
        })
    }

    /// Get a list of currently watched paths.
    pub fn watched_paths(&self) -> &[PathBuf] {
        &self.watched_paths
    }

    fn backend(&mut self) -> Result<&mut RecommendedWatcher> {
        self.inner.as_mut().ok_or(ConfigError::NotInitialized)
    }
}

impl Watcher for NotifyWatcher {
    fn add(&mut self, path: &Path) -> Result<()> {
        let canonical_path = path.canonicalize().map_err(|e| {
            ConfigError::WatchError(format!(
                "Failed to resolve path {}: {}",
                path.display(),
                e
            ))
        })?;

        self.backend()?
            .watch(&canonical_path, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;

        if !self.watched_paths.contains(&canonical_path) {
            self.watched_paths.push(canonical_path);
        }

        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        let canonical_path = path.canonicalize().map_err(|e| {
            ConfigError::WatchError(format!(
                "Failed to resolve path for unwatching {}: {}",
                path.display(),
                e
            ))
        })?;

        self.backend()?
            .unwatch(&canonical_path)
            .map_err(|e| ConfigError::WatchError(format!("Failed to unwatch path: {}", e)))?;

        self.watched_paths.retain(|p| p != &canonical_path);

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(backend) => {
                drop(backend);
                self.watched_paths.clear();
                Ok(())
            }
            None => Err(ConfigError::NotInitialized),
        }
    }

    fn take_streams(&mut self) -> Option<WatchStreams> {
        self.streams.take()
    }
}

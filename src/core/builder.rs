//! Builder for constructing ConfigManager instances.

use crate::core::{ConfigManager, RetryPolicy};
use crate::error::{ConfigError, Result};
use crate::sources::{FileLoader, Loader};
use crate::watch::{NotifyWatcher, Watcher};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::Span;

/// Builder for constructing a [`ConfigManager`].
///
/// A manager needs a loader and a watcher. [`with_file`](Self::with_file)
/// supplies both: a [`FileLoader`] for the path and, unless a watcher is set
/// explicitly, a [`NotifyWatcher`].
///
/// # Examples
///
/// ```rust,no_run
/// use hotreload_config::prelude::*;
/// use serde::Deserialize;
/// use std::time::Duration;
///
/// #[derive(Debug, Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// # fn example() -> Result<()> {
/// let manager = ConfigManager::<AppConfig>::builder()
///     .with_file("config/app.json")
///     .with_retry_policy(RetryPolicy::new(5, Duration::from_millis(200))?)
///     .with_span(tracing::info_span!("app_config"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigManagerBuilder<T> {
    loader: Option<Result<Box<dyn Loader<T>>>>,
    watcher: Option<Box<dyn Watcher>>,
    notify_watcher: bool,
    retry_policy: RetryPolicy,
    span: Option<Span>,
}

impl<T> ConfigManagerBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Create a new builder with the default retry policy.
    pub fn new() -> Self {
        Self {
            loader: None,
            watcher: None,
            notify_watcher: false,
            retry_policy: RetryPolicy::default(),
            span: None,
        }
    }

    /// Use a custom loader.
    pub fn with_loader<L: Loader<T> + 'static>(mut self, loader: L) -> Self {
        self.loader = Some(Ok(Box::new(loader)));
        self
    }

    /// Use a custom watcher.
    pub fn with_watcher<W: Watcher + 'static>(mut self, watcher: W) -> Self {
        self.watcher = Some(Box::new(watcher));
        self
    }

    /// Set the retry policy for reloads.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Record the manager's log events inside `span`.
    ///
    /// Defaults to an `info`-level span named `config_manager`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Build the manager. No configuration is loaded until `init`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDependency`] if no loader or watcher was
    /// supplied, the error from [`FileLoader::new`] if the file extension is
    /// not supported, or a watch error if the OS watcher cannot be created.
    pub fn build(self) -> Result<ConfigManager<T>> {
        let loader = self
            .loader
            .ok_or(ConfigError::MissingDependency("loader"))??;

        let watcher = match self.watcher {
            Some(watcher) => watcher,
            None if self.notify_watcher => Box::new(NotifyWatcher::new()?),
            None => return Err(ConfigError::MissingDependency("watcher")),
        };

        let span = self
            .span
            .unwrap_or_else(|| tracing::info_span!("config_manager"));

        Ok(ConfigManager::from_parts(
            loader,
            watcher,
            span,
            self.retry_policy,
        ))
    }
}

impl<T> ConfigManagerBuilder<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Load from `path`, decoding by extension, and watch it with a
    /// [`NotifyWatcher`] unless another watcher is set.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader =
            Some(FileLoader::new(path).map(|loader| Box::new(loader) as Box<dyn Loader<T>>));
        self.notify_watcher = true;
        self
    }
}

impl<T> Default for ConfigManagerBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConfigManager<T>
where
    T: Send + Sync + 'static,
{
    /// Create a new builder for constructing a manager.
    pub fn builder() -> ConfigManagerBuilder<T> {
        ConfigManagerBuilder::new()
    }
}

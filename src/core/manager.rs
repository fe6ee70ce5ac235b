//! The configuration manager: initial load, watch-driven reload with retry,
//! and publication of the current snapshot.

use crate::core::{ErrorStream, RetryPolicy};
use crate::error::{ConfigError, Result};
use crate::sources::Loader;
use crate::watch::{SubscriberRegistry, SubscriptionHandle, WatchStreams, Watcher, is_write};
use arc_swap::ArcSwapOption;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, warn};

/// Where a manager is in its one-time initialization.
#[derive(Debug, Clone)]
pub enum Lifecycle {
    /// `init` has not been called.
    Uninitialized,
    /// `init` is running, or a previous `init` future was dropped mid-way.
    Initializing,
    /// The initial load succeeded and the background task is running.
    Ready,
    /// The initialization sequence failed with this error.
    Failed(ConfigError),
}

/// How a reload sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReloadOutcome {
    /// A new snapshot was published after this many attempts.
    Reloaded { attempts: u32 },
    /// Every attempt failed and the last error was sent to the error stream.
    Exhausted { attempts: u32 },
    /// Cancellation fired before the sequence finished.
    Cancelled,
}

/// Owns the lifecycle of a single configuration file.
///
/// After [`init`](Self::init) the manager serves the current snapshot to any
/// number of readers and reloads it whenever the watcher reports a write to a
/// watched path. Failed reloads are retried according to the [`RetryPolicy`];
/// a reload that exhausts its attempts leaves the previous snapshot in place
/// and reports the error on [`listen_for_errors`](Self::listen_for_errors).
///
/// Reads are lock-free. Reloads and watch management share one exclusive
/// control lock, so a reload blocks `add_watcher`/`remove_watcher` for its
/// full retry window but never blocks readers.
///
/// # Examples
///
/// ```rust,no_run
/// use hotreload_config::prelude::*;
/// use serde::Deserialize;
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Debug, Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// # async fn example() -> Result<()> {
/// let manager = ConfigManager::<AppConfig>::builder()
///     .with_file("config.yaml")
///     .build()?;
///
/// let shutdown = CancellationToken::new();
/// manager.init(shutdown.clone()).await?;
///
/// println!("Port: {}", manager.get_config().port);
/// # Ok(())
/// # }
/// ```
pub struct ConfigManager<T> {
    inner: Arc<ManagerInner<T>>,
}

struct ManagerInner<T> {
    loader: Box<dyn Loader<T>>,
    /// Current snapshot; `None` until the first successful load
    current: ArcSwapOption<T>,
    /// Control lock. `None` once the watcher has been torn down
    control: Mutex<Option<Box<dyn Watcher>>>,
    retry_policy: RetryPolicy,
    lifecycle: parking_lot::Mutex<Lifecycle>,
    init_gate: Mutex<()>,
    error_tx: mpsc::Sender<ConfigError>,
    errors: ErrorStream,
    subscribers: SubscriberRegistry<T>,
    span: Span,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl<T> ConfigManager<T>
where
    T: Send + Sync + 'static,
{
    /// Create a manager. No I/O happens until [`init`](Self::init).
    ///
    /// Every log event the manager emits, including those from its background
    /// task, is recorded inside `span`.
    pub fn new(
        loader: impl Loader<T> + 'static,
        watcher: impl Watcher + 'static,
        span: Span,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self::from_parts(Box::new(loader), Box::new(watcher), span, retry_policy)
    }

    pub(crate) fn from_parts(
        loader: Box<dyn Loader<T>>,
        watcher: Box<dyn Watcher>,
        span: Span,
        retry_policy: RetryPolicy,
    ) -> Self {
        let (error_tx, errors) = ErrorStream::channel();

        Self {
            inner: Arc::new(ManagerInner {
                loader,
                current: ArcSwapOption::empty(),
                control: Mutex::new(Some(watcher)),
                retry_policy,
                lifecycle: parking_lot::Mutex::new(Lifecycle::Uninitialized),
                init_gate: Mutex::new(()),
                error_tx,
                errors,
                subscribers: SubscriberRegistry::new(),
                span,
                task: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Load the configuration, watch its file, and start the reload task.
    ///
    /// Only the first call does any work. Concurrent callers wait for it, and
    /// every later call returns its outcome without repeating side effects.
    ///
    /// `cancel` bounds the lifetime of the background task: when it fires the
    /// watcher is closed and the task exits.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if the initial load fails (no watch is
    /// registered), or the watcher's error if the path cannot be watched (the
    /// loaded snapshot stays readable). Returns [`ConfigError::InitAbandoned`]
    /// if an earlier `init` future was dropped before completing.
    pub async fn init(&self, cancel: CancellationToken) -> Result<()> {
        let _gate = self.inner.init_gate.lock().await;

        {
            let mut lifecycle = self.inner.lifecycle.lock();
            match &*lifecycle {
                Lifecycle::Ready => return Ok(()),
                Lifecycle::Failed(err) => return Err(err.clone()),
                Lifecycle::Initializing => return Err(ConfigError::InitAbandoned),
                Lifecycle::Uninitialized => {}
            }
            *lifecycle = Lifecycle::Initializing;
        }

        let outcome = self
            .load_and_watch(cancel)
            .instrument(self.inner.span.clone())
            .await;

        *self.inner.lifecycle.lock() = match &outcome {
            Ok(()) => Lifecycle::Ready,
            Err(err) => Lifecycle::Failed(err.clone()),
        };

        outcome
    }

    async fn load_and_watch(&self, cancel: CancellationToken) -> Result<()> {
        let inner = &self.inner;
        let config_path = inner.loader.config_path();

        let initial = inner.loader.load_config(&cancel).await.inspect_err(|e| {
            error!(path = %config_path.display(), error = %e, "Failed to load initial config");
        })?;
        inner.current.store(Some(Arc::new(initial)));

        let streams = {
            let mut control = inner.control.lock().await;
            let watcher = control.as_mut().ok_or(ConfigError::NotInitialized)?;

            watcher.add(&config_path).inspect_err(|e| {
                error!(path = %config_path.display(), error = %e, "Failed to watch config file");
            })?;

            watcher.take_streams().ok_or_else(|| {
                ConfigError::WatchError("watcher streams were already taken".to_string())
            })?
        };

        let task = tokio::spawn(
            Arc::clone(inner)
                .run_event_loop(cancel, streams)
                .instrument(inner.span.clone()),
        );
        *inner.task.lock() = Some(task);

        info!(path = %config_path.display(), "Config loaded and watched");
        Ok(())
    }

    /// Get the current configuration snapshot.
    ///
    /// # Panics
    ///
    /// Panics if called before [`init`](Self::init) has loaded a snapshot.
    /// Callers must check `init`'s result before reading; use
    /// [`try_get_config`](Self::try_get_config) when that is not known.
    pub fn get_config(&self) -> Arc<T> {
        match self.inner.current.load_full() {
            Some(snapshot) => snapshot,
            None => panic!("ConfigManager::get_config called before a successful init"),
        }
    }

    /// Get the current snapshot, or `None` if nothing has been loaded yet.
    pub fn try_get_config(&self) -> Option<Arc<T>> {
        self.inner.current.load_full()
    }

    /// Start watching another path. A write to it triggers a reload.
    ///
    /// Waits for any in-flight reload to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotInitialized`] after the watcher has been torn
    /// down, or the watcher's own error.
    pub async fn add_watcher(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut control = self.inner.control.lock().await;
        let watcher = control.as_mut().ok_or(ConfigError::NotInitialized)?;
        watcher.add(path.as_ref())
    }

    /// Stop watching `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotInitialized`] after the watcher has been torn
    /// down, or the watcher's own error.
    pub async fn remove_watcher(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut control = self.inner.control.lock().await;
        let watcher = control.as_mut().ok_or(ConfigError::NotInitialized)?;
        watcher.remove(path.as_ref())
    }

    /// Stream of reloads that failed after exhausting every retry.
    pub fn listen_for_errors(&self) -> ErrorStream {
        self.inner.errors.clone()
    }

    /// Register a callback for every snapshot published by a reload.
    ///
    /// The initial load is not delivered. Callbacks run on the reload task
    /// while the control lock is held, so keep them short.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle<T>
    where
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    /// Where the manager is in its one-time initialization.
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.lifecycle.lock().clone()
    }

    /// The retry policy used for reloads.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy
    }

    /// Whether the watcher is still live (not yet torn down by cancellation).
    pub async fn is_watching(&self) -> bool {
        self.inner.control.lock().await.is_some()
    }

    /// Wait for the background task to exit.
    ///
    /// Returns immediately if no task was started or it has already been
    /// awaited by an earlier call.
    pub async fn wait_for_shutdown(&self) {
        let task = self.inner.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(parent: &self.inner.span, error = %e, "Config watcher task failed");
            }
        }
    }

    #[cfg(test)]
    pub(crate) async fn reload(&self, cancel: &CancellationToken) -> ReloadOutcome {
        self.inner.reload(cancel).await
    }
}

impl<T> ManagerInner<T>
where
    T: Send + Sync + 'static,
{
    async fn run_event_loop(self: Arc<Self>, cancel: CancellationToken, mut streams: WatchStreams) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.shutdown_watcher().await;
                    return;
                }
                event = streams.events.recv() => {
                    let Some(event) = event else {
                        info!("Config watcher events channel closed");
                        return;
                    };
                    if is_write(&event) {
                        match self.reload(&cancel).await {
                            ReloadOutcome::Reloaded { attempts } => {
                                debug!(attempts, "Reload finished");
                            }
                            ReloadOutcome::Exhausted { attempts } => {
                                debug!(attempts, "Reload gave up, serving previous snapshot");
                            }
                            ReloadOutcome::Cancelled => debug!("Reload cancelled"),
                        }
                    } else {
                        debug!(kind = ?event.kind, paths = ?event.paths, "Ignoring non-write event");
                    }
                }
                err = streams.errors.recv() => {
                    let Some(err) = err else {
                        info!("Config watcher errors channel closed");
                        return;
                    };
                    error!(error = %err, "Watcher error");
                }
            }
        }
    }

    async fn reload(&self, cancel: &CancellationToken) -> ReloadOutcome {
        let _control = self.control.lock().await;
        let config_path = self.loader.config_path();
        let max_attempts = self.retry_policy.max_attempts();

        let mut attempt = 1;
        let last_error = loop {
            match self.loader.load_config(cancel).await {
                Ok(config) => {
                    let snapshot = Arc::new(config);
                    self.current.store(Some(Arc::clone(&snapshot)));
                    self.subscribers.notify_all(&snapshot);
                    info!(path = %config_path.display(), attempt, "Config reloaded");
                    return ReloadOutcome::Reloaded { attempts: attempt };
                }
                Err(e) if cancel.is_cancelled() => {
                    debug!(
                        path = %config_path.display(),
                        attempt,
                        error = %e,
                        "Reload attempt failed during shutdown"
                    );
                    return ReloadOutcome::Cancelled;
                }
                Err(e) => {
                    warn!(
                        path = %config_path.display(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "Error reloading config"
                    );
                    if attempt >= max_attempts {
                        break e;
                    }
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return ReloadOutcome::Cancelled,
                _ = tokio::time::sleep(self.retry_policy.timeout()) => {}
            }
            attempt += 1;
        };

        error!(
            path = %config_path.display(),
            attempts = max_attempts,
            error = %last_error,
            "Failed to reload config after retries"
        );

        // Blocks while an earlier error is still undrained.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(path = %config_path.display(), "Dropping reload error, manager is shutting down");
                ReloadOutcome::Cancelled
            }
            sent = self.error_tx.send(last_error) => {
                if sent.is_err() {
                    debug!("Error stream receiver is gone");
                }
                ReloadOutcome::Exhausted { attempts: max_attempts }
            }
        }
    }

    async fn shutdown_watcher(&self) {
        let mut control = self.control.lock().await;
        if let Some(mut watcher) = control.take() {
            info!(path = %self.loader.config_path().display(), "Config watcher stopped");
            if let Err(e) = watcher.close() {
                error!(error = %e, "Failed to close watcher");
            }
        }
    }
}

impl<T> Clone for ConfigManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

//! Single-slot error-notification channel.

use crate::error::ConfigError;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Read side of the manager's error-notification channel.
///
/// The channel carries reloads that exhausted every retry. An error here means
/// the configuration being served is stale relative to the file on disk.
///
/// The channel holds a single error. While that slot is full the reload task
/// waits for it to be drained before finishing, which holds back every
/// later reload. Drain it promptly.
///
/// Clones share the same receiver. Each error is delivered to exactly one of them.
#[derive(Clone)]
pub struct ErrorStream {
    rx: Arc<Mutex<mpsc::Receiver<ConfigError>>>,
}

impl ErrorStream {
    pub(crate) fn channel() -> (mpsc::Sender<ConfigError>, Self) {
        let (tx, rx) = mpsc::channel(1);
        (
            tx,
            Self {
                rx: Arc::new(Mutex::new(rx)),
            },
        )
    }

    /// Wait for the next reload failure.
    ///
    /// Returns `None` only after every [`ConfigManager`](crate::core::ConfigManager)
    /// clone has been dropped and the background task has exited. Cancelling
    /// the manager does not end the stream while a clone is still alive, so
    /// use [`wait_for_shutdown`](crate::core::ConfigManager::wait_for_shutdown)
    /// to observe shutdown instead of waiting here.
    pub async fn recv(&self) -> Option<ConfigError> {
        self.rx.lock().await.recv().await
    }

    /// Take a pending reload failure without waiting.
    ///
    /// Returns `None` if no error is pending or another clone is currently
    /// waiting in [`recv`](Self::recv).
    pub fn try_recv(&self) -> Option<ConfigError> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}

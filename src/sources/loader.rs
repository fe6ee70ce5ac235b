//! Loader trait.

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Trait for configuration loaders.
///
/// A loader produces a fresh configuration value every time it is called.
/// The manager calls it once during initialization and again for every
/// reload attempt, so implementations must be safe to call repeatedly.
///
/// Implementations should watch `cancel` and return
/// [`ConfigError::Cancelled`](crate::error::ConfigError::Cancelled) promptly
/// once it fires.
#[async_trait]
pub trait Loader<T>: Send + Sync {
    /// Load a fresh configuration value.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoded.
    async fn load_config(&self, cancel: &CancellationToken) -> Result<T>;

    /// The path this loader reads from. The manager watches it.
    fn config_path(&self) -> PathBuf;
}

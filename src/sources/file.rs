//! File-based configuration loader.

use super::{Format, Loader};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Loads a configuration value of type `T` from a single file.
///
/// The format is detected from the file extension when the loader is
/// created; see [`Format`] for the supported extensions.
///
/// # Examples
///
/// ```rust,no_run
/// use hotreload_config::sources::FileLoader;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// # fn example() -> hotreload_config::error::Result<()> {
/// let loader = FileLoader::<AppConfig>::new("config/app.yaml")?;
/// # Ok(())
/// # }
/// ```
pub struct FileLoader<T> {
    path: PathBuf,
    format: Format,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FileLoader<T> {
    /// Create a loader for `path`, picking the decoder from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] if the extension has no decoder.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = Format::from_path(&path)?;
        Ok(Self::with_format(path, format))
    }

    /// Create a loader for `path` that always decodes with `format`.
    pub fn with_format(path: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            path: path.into(),
            format,
            _marker: PhantomData,
        }
    }

    /// The format used to decode the file.
    pub fn format(&self) -> Format {
        self.format
    }

    /// The file being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self, cancel: &CancellationToken) -> Result<String> {
        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ConfigError::Cancelled),
            read = tokio::fs::read_to_string(&self.path) => read,
        };

        text.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::LoadError(format!(
                "Configuration file not found: {}",
                self.path.display()
            )),
            _ => ConfigError::from(e),
        })
    }
}

#[async_trait]
impl<T> Loader<T> for FileLoader<T>
where
    T: DeserializeOwned + Send + Sync,
{
    async fn load_config(&self, cancel: &CancellationToken) -> Result<T> {
        let text = self.read(cancel).await?;
        self.format.decode(&text)
    }

    fn config_path(&self) -> PathBuf {
        self.path.clone()
    }
}

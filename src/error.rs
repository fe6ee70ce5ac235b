//! Error types for hotreload-config.

use std::sync::Arc;

/// Result type alias for hotreload-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading, watching or reloading configuration.
///
/// The type is `Clone` so that the outcome of the one-time initialization can
/// be handed to every caller of [`ConfigManager::init`](crate::core::ConfigManager::init).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Failed to load configuration from its source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Failed to parse the raw configuration text.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Parsed configuration did not match the target type.
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),

    /// No decoder exists for the given file extension.
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// The file watcher failed or reported an error.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// The watcher has already been torn down.
    #[error("Watcher not initialized")]
    NotInitialized,

    /// A required collaborator was not supplied at construction time.
    #[error("Missing required dependency: {0}")]
    MissingDependency(&'static str),

    /// The retry policy is out of range.
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    /// The operation was abandoned because its cancellation token fired.
    #[error("Operation cancelled")]
    Cancelled,

    /// A previous initialization attempt was dropped before it finished.
    #[error("Initialization was abandoned before completing")]
    InitAbandoned,

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(Arc<std::io::Error>),

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(Arc::new(err))
    }
}

impl From<notify::Error> for ConfigError {
    fn from(err: notify::Error) -> Self {
        ConfigError::WatchError(err.to_string())
    }
}

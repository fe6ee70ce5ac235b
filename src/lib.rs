//! # hotreload-config
//!
//! Keeps a single configuration file loaded in memory, reloads it when the
//! file is written, and retries failed reloads with a fixed delay.
//!
//! ## Overview
//!
//! `hotreload-config` is built around [`ConfigManager`](core::ConfigManager), which:
//! - Loads the configuration once during `init`
//! - Watches the file and reloads on every content write
//! - Retries failed reloads according to a [`RetryPolicy`](core::RetryPolicy)
//! - Publishes snapshots atomically using `arc-swap`; readers never block
//! - Reports reloads that exhausted their retries on an error stream
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotreload_config::prelude::*;
//! use serde::Deserialize;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     metrics: MetricsConfig,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct MetricsConfig {
//!     enable: bool,
//!     port: u16,
//! }
//!
//! # async fn example() -> hotreload_config::error::Result<()> {
//! let manager = ConfigManager::<AppConfig>::builder()
//!     .with_file("config/app.yaml")
//!     .build()?;
//!
//! let shutdown = CancellationToken::new();
//! manager.init(shutdown.clone()).await?;
//!
//! // Lock-free reads
//! let cfg = manager.get_config();
//! println!("Metrics on port {}: {}", cfg.metrics.port, cfg.metrics.enable);
//!
//! // Surface reloads that failed after every retry
//! let errors = manager.listen_for_errors();
//! tokio::spawn(async move {
//!     while let Some(err) = errors.recv().await {
//!         eprintln!("config is stale: {}", err);
//!     }
//! });
//!
//! // Stops the watcher and the reload task
//! shutdown.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! All diagnostics go through `tracing`, inside the span passed to the
//! manager. Install any `tracing` subscriber to see them.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod sources;
pub mod watch;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigManager, ConfigManagerBuilder, ErrorStream, RetryPolicy};
    pub use crate::error::{ConfigError, Result};
    pub use crate::sources::{FileLoader, Loader};
    pub use crate::watch::{NotifyWatcher, Watcher};
}

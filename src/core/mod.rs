//! Core configuration management types.

mod builder;
mod error_stream;
mod manager;
mod retry;

#[cfg(test)]
mod test_support;

pub use builder::ConfigManagerBuilder;
pub use error_stream::ErrorStream;
pub use manager::{ConfigManager, Lifecycle};
pub use retry::RetryPolicy;

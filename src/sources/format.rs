//! Extension-based decoding of configuration text.

use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// A configuration file format.
///
/// The format is chosen from the file extension:
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
/// - `.toml` -> TOML
///
/// # Examples
///
/// ```rust
/// use hotreload_config::sources::Format;
///
/// assert_eq!(Format::from_extension(".yml").unwrap(), Format::Yaml);
/// assert!(Format::from_extension("xml").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON documents.
    Json,
    /// YAML documents.
    Yaml,
    /// TOML documents.
    Toml,
}

impl Format {
    /// Pick a format from a file extension, with or without the leading dot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = extension.strip_prefix('.').unwrap_or(extension);

        match normalized.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            _ => Err(ConfigError::UnsupportedFormat(format!(
                "unsupported file extension: .{}. Supported: .json, .yaml, .yml, .toml",
                normalized
            ))),
        }
    }

    /// Pick a format from the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] if the path has no extension
    /// or the extension is not supported.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::UnsupportedFormat(format!(
                    "unable to determine file format for: {}",
                    path.display()
                ))
            })?;

        Self::from_extension(extension)
    }

    /// Decode configuration text into `T`.
    ///
    /// Keys are matched exactly as written, so `camelCase` and other
    /// mixed-case keys map onto `#[serde(rename)]` fields unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the text is not valid for this
    /// format, or [`ConfigError::DeserializationError`] if it does not match `T`.
    pub fn decode<T>(&self, text: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        // Parse into the format's own document model first so syntax errors
        // and shape mismatches stay distinguishable.
        match self {
            Format::Json => {
                let value: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| self.parse_error(e))?;
                serde_json::from_value(value).map_err(|e| self.decoding_error(e))
            }
            Format::Yaml => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(text).map_err(|e| self.parse_error(e))?;
                serde_yaml::from_value(value).map_err(|e| self.decoding_error(e))
            }
            Format::Toml => {
                let table: toml::Table = text.parse().map_err(|e| self.parse_error(e))?;
                toml::Value::Table(table)
                    .try_into()
                    .map_err(|e| self.decoding_error(e))
            }
        }
    }

    fn parse_error(&self, err: impl std::fmt::Display) -> ConfigError {
        ConfigError::ParseError(format!("{} parsing error: {}", self, err))
    }

    fn decoding_error(&self, err: impl std::fmt::Display) -> ConfigError {
        ConfigError::DeserializationError(format!("{} decoding error: {}", self, err))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        };
        f.write_str(name)
    }
}

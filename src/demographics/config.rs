//! Configuration loading
//!
//! `defaults/demographics.default.toml` is embedded into the crate so that the
//! documented defaults and the runtime behavior stay in sync. Callers layer
//! their own files and key overrides on top via [`Loader`] before
//! deserializing into [`DemographicsConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/demographics.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemographicsConfig {
    pub reading: ReaderConfig,
}

/// Window sizes used while reading an article, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReaderConfig {
    pub max_snippet_len: usize,
    pub max_details_len: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_snippet_len: 100,
            max_details_len: 150,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `reading.max_snippet_len`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<DemographicsConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_defaults_match_code_defaults() {
        let config = Loader::new().build().expect("defaults to deserialize");
        assert_eq!(config.reading, ReaderConfig::default());
        assert_eq!(config.reading.max_snippet_len, 100);
        assert_eq!(config.reading.max_details_len, 150);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("reading.max_details_len", 80_i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.reading.max_details_len, 80);
        assert_eq!(config.reading.max_snippet_len, 100);
    }

    #[test]
    fn user_file_is_layered_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[reading]\nmax_snippet_len = 60").expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.reading.max_snippet_len, 60);
        assert_eq!(config.reading.max_details_len, 150);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new()
            .with_file("/nonexistent/participants-demographics.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn string_overrides_are_converted() {
        let config = Loader::new()
            .set_override("reading.max_snippet_len", "60")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.reading.max_snippet_len, 60);
    }

    #[test]
    fn unknown_value_type_is_an_error() {
        let result = Loader::new()
            .set_override("reading.max_snippet_len", "many")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}

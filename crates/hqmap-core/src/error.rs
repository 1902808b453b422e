//! Error types for hqmap core

use hqmap_extract::{ExtractError, ModelError};
use std::path::PathBuf;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// Query rejected
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model client could not be constructed
    #[error("model setup failed: {0}")]
    Model(#[from] ModelError),
}

impl AtlasError {
    /// Whether the caller supplied a bad query
    #[must_use]
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::Extract(e) if e.is_invalid_query())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for the schema
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid setting: {0}")]
    Invalid(String),
}

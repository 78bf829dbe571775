//! Error types for the settings crate.

use thiserror::Error;

/// Errors raised while reading card configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The required `location` option is absent or blank.
    #[error("You must specify a location.")]
    MissingLocation,

    /// The configuration could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

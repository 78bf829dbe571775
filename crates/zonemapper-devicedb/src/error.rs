//! Error types for the device registry crate.

use thiserror::Error;

/// Errors that can occur while reading the host registries.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The host call failed.
    #[error("Failed to fetch {registry} registry: {reason}")]
    Fetch { registry: String, reason: String },

    /// The host returned data of an unexpected shape.
    #[error("Failed to decode registry data: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RegistryError {
    pub fn fetch(registry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            registry: registry.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

//! Error types shared across the zone mapper crates.
//!
//! Most failure modes in the editor recover locally (missing sensor state is
//! skipped, registry failures leave dropdowns empty), so these variants mostly
//! travel as far as a log line.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Shape payload does not satisfy its geometry invariants.
    #[error("Invalid {shape} geometry: {reason}")]
    InvalidGeometry {
        /// Shape tag of the rejected payload.
        shape: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Zone ids must be positive.
    #[error("Invalid zone id: {0}")]
    InvalidZoneId(i64),

    /// The host backend rejected or failed an update call.
    #[error("Backend call failed: {0}")]
    Backend(String),

    /// The device/entity registry could not be read.
    #[error("Registry unavailable: {0}")]
    Registry(String),
}

impl Error {
    pub fn invalid_geometry(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            shape: shape.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_geometry("polygon", "needs at least 3 points");
        assert_eq!(
            err.to_string(),
            "Invalid polygon geometry: needs at least 3 points"
        );
        assert_eq!(Error::InvalidZoneId(0).to_string(), "Invalid zone id: 0");
        assert_eq!(
            Error::Backend("timeout".into()).to_string(),
            "Backend call failed: timeout"
        );
    }
}

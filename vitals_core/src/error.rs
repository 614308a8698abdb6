//! Error types for the vitals_core library.

use crate::store::AvailabilityStatus;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Validation failures raised before anything reaches the health store
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A field the record variant needs was absent (or an empty sequence)
    #[error("missing mandatory field: {0}")]
    MissingField(String),

    /// Temporal ordering or nesting was violated
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// The unit does not belong to the quantity kind
    #[error("invalid unit '{unit}' for {kind}")]
    InvalidUnit { kind: &'static str, unit: String },

    /// The value is non-finite or outside the quantity's domain
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Opaque failure reported by the health store, carried unchanged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Core error type for vitals_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input rejected by local validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested capability was not granted
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Failure surfaced from the health store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The health store cannot be used on this device
    #[error("Health store not available: {0:?}")]
    NotAvailable(AvailabilityStatus),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The validation failure, if this error is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

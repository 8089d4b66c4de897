//! Error types for the rio GPU layer
//!
//! This module defines the error types used throughout the layer,
//! including backend failures, contract violations and broken assets.

use std::fmt;

/// Result type for rio GPU operations
pub type RioResult<T> = Result<T, RioError>;

/// rio GPU errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RioError {
    /// Backend-specific error (GX2 model, OpenGL, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (context, device, subsystems)
    InitializationFailed(String),

    /// Caller broke an API contract (unaligned data, bad slot, stale layout, ...)
    ContractViolation(String),

    /// Packaged asset is malformed (bad magic/version, shader compile failure, ...)
    InvalidAsset(String),

    /// File could not be read
    Io(String),
}

impl fmt::Display for RioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RioError::BackendError(msg) => write!(f, "Backend error: {}", msg),
            RioError::OutOfMemory => write!(f, "Out of GPU memory"),
            RioError::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            RioError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            RioError::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
            RioError::InvalidAsset(msg) => write!(f, "Invalid asset: {}", msg),
            RioError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for RioError {}

impl From<std::io::Error> for RioError {
    fn from(err: std::io::Error) -> Self {
        RioError::Io(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// Copyright 2025 Cowboy AI, LLC.

//! Error types for schema projection
//!
//! Guards themselves never fail: a non-conforming value is a `false`, not an
//! error. The only fallible operation is projecting a guard into an external
//! schema representation.

use thiserror::Error;

/// Errors that can occur while projecting a guard into a schema
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// No schema backend could be resolved
    #[error("Schema backend unavailable: {backend} - {reason}")]
    BackendUnavailable {
        /// Backend that was looked for
        backend: String,
        /// Why it could not be resolved
        reason: String,
    },

    /// The backend could not express a schema node
    #[error("Schema rendering failed in {backend}: {reason}")]
    Render {
        /// Backend that refused the node
        backend: String,
        /// What went wrong
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Serialization(err.to_string())
    }
}

impl SchemaError {
    /// Create a backend-unavailable error
    pub fn unavailable(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::BackendUnavailable {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Create a render error
    pub fn render(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Render {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a missing-backend error
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, SchemaError::BackendUnavailable { .. })
    }

    /// Check if retrying after a configuration change can succeed
    pub fn is_recoverable(&self) -> bool {
        self.is_backend_unavailable()
    }
}

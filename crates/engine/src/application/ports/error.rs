//! Error types for port operations.

use sheetbridge_domain::{DomainError, RecordId};

/// Persistence operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store refused the batch - nothing was applied.
    #[error("Store rejected {operation}: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },

    /// Backend failure (connection, corruption) - includes operation name for tracing.
    #[error("Store backend error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create a Rejected error with operation context.
    pub fn rejected(operation: &'static str, message: impl ToString) -> Self {
        Self::Rejected {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Backend error with operation context.
    pub fn backend(operation: &'static str, message: impl ToString) -> Self {
        Self::Backend {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }
}

/// Errors raised while rewriting a proposed patch.
///
/// The rewriter is fail-open for keys outside its recognized namespaces; it
/// only raises `Malformed` for broken data *inside* a namespace it owns.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("Malformed legacy key '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error("Unknown record: {0}")]
    UnknownRecord(RecordId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl PatchError {
    pub fn malformed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

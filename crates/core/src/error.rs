//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// Deterministic failures only. Store and transport failures have their own
/// error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (parse failure, blank or padded scope id).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

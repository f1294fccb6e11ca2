//! Error types for store access and caller transforms.
//!
//! The two enums keep the failure categories distinct: a
//! [`TransformError`] means the caller's refactor logic failed for one
//! document, a [`StoreError`] means the backend could not load or persist
//! it. The run ledger records them in separate buckets so callers can tell
//! "my logic failed" apart from "the store refused to save".

use thiserror::Error;

/// Errors raised by an [`ObjectStore`](crate::ObjectStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document of the expected kind exists at the given path.
    #[error("document not found: {0}")]
    NotFound(String),
    /// A document could not be encoded or decoded.
    #[error("document format error: {0}")]
    Format(String),
    /// The store refused to persist a document.
    #[error("save rejected for {0}")]
    SaveRejected(String),
}

/// Error returned by a caller-supplied transform.
///
/// Reserve this for genuinely unexpected failures; an expected no-op should
/// be signalled by returning [`TransformOutcome::skipped`](crate::TransformOutcome::skipped)
/// instead. A `TransformError` is caught at the document boundary, recorded
/// in the failure ledger, and never corrupts other documents.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransformError {
    message: String,
}

impl TransformError {
    /// Creates a transform error with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The captured error text.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for TransformError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for TransformError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<StoreError> for TransformError {
    fn from(err: StoreError) -> Self {
        Self::new(err.to_string())
    }
}

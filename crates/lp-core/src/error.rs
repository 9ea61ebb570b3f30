//! # AppError
//!
//! Centralized error taxonomy for the Linkpage core. Maps domain-specific
//! failures to actionable error types.

use thiserror::Error;

/// The primary error type for all lp-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Candidate public name fails the `[a-z0-9-]`, length >= 3 rule.
    /// Decided before any persistence call.
    #[error("invalid name {0:?}: use at least 3 of a-z, 0-9 or '-'")]
    InvalidName(String),

    /// Name already bound to a different owner at claim time. Recoverable:
    /// the user picks another name, nothing was written.
    #[error("name {0:?} is already claimed by another account")]
    Conflict(String),

    /// Acting identity does not match the document's owner on an edit
    /// attempt. Fatal for that session's edit intent.
    #[error("permission denied")]
    PermissionDenied,

    /// No document under the requested name.
    #[error("no page named {0:?}")]
    NotFound(String),

    /// Upload rejected locally before any network call.
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: usize, limit: usize },

    /// Upload precondition or transport failure; working state untouched.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// Persistence transport/backend failure on read or write. Retryable;
    /// unsaved edits are preserved in memory.
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Port implementations surface `anyhow::Error`; at the core boundary that
/// always means the backing service misbehaved.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

/// A specialized Result type for Linkpage core logic.
pub type Result<T> = std::result::Result<T, AppError>;

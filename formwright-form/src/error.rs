//! Error types for editing sessions.

use formwright_model::{SchemaError, ValidationError};
use formwright_store::StoreError;
use formwright_types::FieldPath;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// A persistence collaborator failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct IoError {
    pub message: String,
}

impl IoError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A dialog collaborator failed to produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    #[error("dialog closed without an answer")]
    Dismissed,

    #[error("dialog failed: {0}")]
    Failed(String),
}

/// Errors that can occur while editing or saving a form.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Path(#[from] formwright_types::Error),

    /// The persistence collaborator failed; the value is left as it was.
    #[error("persistence error: {0}")]
    Io(#[from] IoError),

    #[error(transparent)]
    Dialog(#[from] DialogError),

    /// `save()` was called while a save is already running.
    #[error("a save is already in flight")]
    SaveInFlight,

    /// The write path is closed while saving.
    #[error("session is saving; edits are disabled")]
    Busy,

    /// Constraints or hooks reported problems; nothing was saved.
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error("no field is declared at '{0}'")]
    UnknownField(FieldPath),

    #[error("'{0}' is not an array of objects")]
    NotAnElementList(FieldPath),

    /// After-change hooks kept writing past the configured limit.
    #[error("after-change hooks exceeded {limit} writes")]
    HookWriteLimit { limit: usize },
}

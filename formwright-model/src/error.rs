use formwright_types::FieldPath;
use serde::Serialize;
use thiserror::Error;

/// Result type for schema construction and attach-time checks.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Structural problems in a schema. Detected once, when a form is attached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("field '{field}' of kind {kind} has no nested form")]
    MissingNestedSchema { field: String, kind: String },

    #[error("flow of form '{form}' references unknown field '{key}'")]
    UnknownFlowKey { form: String, key: String },

    #[error("flow of form '{form}' lists '{key}' more than once")]
    DuplicateFlowKey { form: String, key: String },

    #[error("form '{form}' declares field '{key}' more than once")]
    DuplicateField { form: String, key: String },

    #[error("invalid field key '{key}': {reason}")]
    InvalidPath { key: String, reason: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid descriptor for '{field}': {reason}")]
    InvalidDescriptor { field: String, reason: String },
}

/// A failed constraint (or hook) on one field. Blocks saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    pub path: FieldPath,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Raised by a visibility predicate that could not decide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PredicateError(pub String);

impl PredicateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The predicate needed a value that is not there.
    pub fn missing(what: impl std::fmt::Display) -> Self {
        Self(format!("missing value: {what}"))
    }
}

/// Raised by an after-change hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

//! Error types for the SDL bridge.

use thiserror::Error;

pub type SdlResult<T> = Result<T, SdlError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdlError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax { line: usize, column: usize, message: String },

    #[error("unsupported at line {line}, column {column}: {what}")]
    Unsupported { line: usize, column: usize, what: String },

    /// The model cannot be written as SDL.
    #[error("cannot print '{element}': {reason}")]
    Print { element: String, reason: String },

    #[error("'{0}' is not a valid GraphQL name")]
    InvalidName(String),

    #[error("type '{0}' already exists")]
    DuplicateType(String),

    #[error("no type at index {0}")]
    NoSuchType(usize),

    #[error("type {type_index} has no field at index {field_index}")]
    NoSuchField { type_index: usize, field_index: usize },

    #[error("invalid field value: {0}")]
    InvalidField(String),

    #[error("SDL service error: {0}")]
    Service(String),
}

impl SdlError {
    pub(crate) fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        SdlError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Message suitable for showing next to the editor.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

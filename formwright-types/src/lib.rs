//! Core type definitions for Formwright.
//!
//! This crate defines the small, domain-agnostic types shared by every other
//! crate in the workspace:
//! - [`FieldPath`]: dot/bracket addresses into a configuration value
//!   (`mtlsConfig.mtls`, `targets[2].hostname`)
//! - [`ElementId`]: stable identity of an array element (UUID v7)
//!
//! Anything that knows about schemas, flows or sessions lives elsewhere.

mod ids;
mod path;

pub use ids::ElementId;
pub use path::{FieldPath, Segment};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

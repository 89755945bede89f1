//! Error types for plugin forms.

use formwright_model::SchemaError;
use thiserror::Error;

pub type PluginResult<T> = Result<T, PluginError>;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin not found: {0}")]
    NotFound(String),

    #[error("plugin '{id}' is excluded from the catalog: {reason}")]
    Excluded { id: String, reason: String },

    /// A transform expected a field the generated schema does not declare.
    #[error("plugin '{plugin}' has no '{field}' field to specialize")]
    MissingField { plugin: String, field: String },

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

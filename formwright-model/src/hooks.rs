use crate::error::HookError;
use serde_json::Value;
use std::sync::Arc;

/// Read/write access a hook gets to the value, relative to its scope.
///
/// The scope is the array element being edited for a hook declared on an
/// array-of-objects field, the field itself for an object field, and the
/// declaring form otherwise. Keys are paths (`port`, `mtlsConfig.mtls`).
pub trait FieldAccess {
    /// Reads a value, seeing writes this hook already made.
    fn get(&self, key: &str) -> Option<Value>;

    /// Queues a write. Applied once the hook returns successfully.
    fn set(&mut self, key: &str, value: Value) -> Result<(), HookError>;
}

/// Runs after a write lands on or below the declaring field.
///
/// Receives the declaring field's current value.
pub type AfterChangeHook = Arc<dyn Fn(&Value, &mut dyn FieldAccess) -> Result<(), HookError> + Send + Sync>;

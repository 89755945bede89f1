//! Visibility evaluation.
//!
//! Predicates that cannot decide (missing ancestor, wrong shape, predicate
//! error or panic) make the field visible. Hiding a field because a
//! predicate broke would hide data the user may need to fix.

use formwright_model::{FieldSchema, PredicateError, Visibility};
use formwright_types::{FieldPath, Segment};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::warn;

static NULL: Value = Value::Null;

/// Why a predicate could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisibilityEvalError {
    #[error("cannot read '{path}': {reason}")]
    Path { path: FieldPath, reason: String },

    #[error("predicate failed: {0}")]
    Predicate(#[from] PredicateError),

    #[error("predicate panicked")]
    Panicked,

    #[error("element predicate evaluated outside an array element")]
    NoElement,
}

/// What a predicate is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvalScope<'a> {
    pub root: &'a Value,
    /// Value of the form that declares the field.
    pub form_value: &'a Value,
    pub element_index: Option<usize>,
}

impl<'a> EvalScope<'a> {
    pub fn root(root: &'a Value) -> Self {
        Self {
            root,
            form_value: root,
            element_index: None,
        }
    }
}

/// Returns whether `field` is shown. Evaluation failures count as visible.
pub fn is_visible(field: &FieldSchema, scope: &EvalScope<'_>) -> bool {
    match evaluate(&field.visibility, scope) {
        Ok(visible) => visible,
        Err(e) => {
            warn!(error = %e, "visibility predicate failed, showing field");
            true
        }
    }
}

/// Evaluates a visibility expression, reporting failures.
pub fn evaluate(visibility: &Visibility, scope: &EvalScope<'_>) -> Result<bool, VisibilityEvalError> {
    match visibility {
        Visibility::Always => Ok(true),
        Visibility::Never => Ok(false),
        Visibility::FieldEquals { path, value } => Ok(read(scope.form_value, path)? == value),
        Visibility::FieldTruthy(path) => Ok(truthy(read(scope.form_value, path)?)),
        Visibility::FieldPredicate { path, test } => {
            let value = read(scope.form_value, path)?;
            guarded(|| test(value))
        }
        Visibility::ArrayElementPredicate { ancestor, test } => {
            let index = scope.element_index.ok_or(VisibilityEvalError::NoElement)?;
            let value = read(scope.root, ancestor)?;
            guarded(|| test(value, index))
        }
        Visibility::Not(inner) => Ok(!evaluate(inner, scope)?),
        Visibility::All(all) => {
            for v in all {
                if !evaluate(v, scope)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Visibility::Any(any) => {
            for v in any {
                if evaluate(v, scope)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn guarded(f: impl FnOnce() -> Result<bool, PredicateError>) -> Result<bool, VisibilityEvalError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => Ok(result?),
        Err(_) => Err(VisibilityEvalError::Panicked),
    }
}

/// Reads `path` under `base`. A missing last segment reads as `null`;
/// anything missing or mis-shaped before it is an error.
fn read<'v>(base: &'v Value, path: &FieldPath) -> Result<&'v Value, VisibilityEvalError> {
    let segments = path.segments();
    let mut current = base;
    for (depth, segment) in segments.iter().enumerate() {
        let here = || FieldPath::from_segments(segments[..=depth].to_vec());
        let next = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            (_, other) => {
                return Err(VisibilityEvalError::Path {
                    path: here(),
                    reason: format!("parent is {}", shape(other)),
                })
            }
        };
        current = match next {
            Some(value) => value,
            None if depth + 1 == segments.len() => &NULL,
            None => {
                return Err(VisibilityEvalError::Path {
                    path: here(),
                    reason: "missing".to_string(),
                })
            }
        };
    }
    Ok(current)
}

/// Loose truthiness: null, false, zero and the empty string are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

use crate::error::PredicateError;
use formwright_types::FieldPath;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type ValueTest = dyn Fn(&Value) -> Result<bool, PredicateError> + Send + Sync;
type ElementTest = dyn Fn(&Value, usize) -> Result<bool, PredicateError> + Send + Sync;

/// When a field is shown.
///
/// Paths in `FieldEquals`, `FieldTruthy` and `FieldPredicate` are relative to
/// the form that declares the field (inside an array element, the element).
/// `ArrayElementPredicate` names an absolute ancestor path instead and also
/// receives the index of the element being rendered.
#[derive(Clone, Default)]
pub enum Visibility {
    #[default]
    Always,
    Never,
    FieldEquals {
        path: FieldPath,
        value: Value,
    },
    FieldTruthy(FieldPath),
    FieldPredicate {
        path: FieldPath,
        test: Arc<ValueTest>,
    },
    ArrayElementPredicate {
        ancestor: FieldPath,
        test: Arc<ElementTest>,
    },
    Not(Box<Visibility>),
    All(Vec<Visibility>),
    Any(Vec<Visibility>),
}

impl Visibility {
    pub fn equals(path: FieldPath, value: impl Into<Value>) -> Self {
        Visibility::FieldEquals {
            path,
            value: value.into(),
        }
    }

    pub fn predicate<F>(path: FieldPath, test: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Visibility::FieldPredicate {
            path,
            test: Arc::new(test),
        }
    }

    pub fn element<F>(ancestor: FieldPath, test: F) -> Self
    where
        F: Fn(&Value, usize) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Visibility::ArrayElementPredicate {
            ancestor,
            test: Arc::new(test),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Visibility) -> Self {
        Visibility::Not(Box::new(inner))
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Visibility::Always)
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Visibility::Always
        } else {
            Visibility::Never
        }
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Always => f.write_str("Always"),
            Visibility::Never => f.write_str("Never"),
            Visibility::FieldEquals { path, value } => f
                .debug_struct("FieldEquals")
                .field("path", &path.to_string())
                .field("value", value)
                .finish(),
            Visibility::FieldTruthy(path) => f.debug_tuple("FieldTruthy").field(&path.to_string()).finish(),
            Visibility::FieldPredicate { path, .. } => f
                .debug_struct("FieldPredicate")
                .field("path", &path.to_string())
                .finish_non_exhaustive(),
            Visibility::ArrayElementPredicate { ancestor, .. } => f
                .debug_struct("ArrayElementPredicate")
                .field("ancestor", &ancestor.to_string())
                .finish_non_exhaustive(),
            Visibility::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Visibility::All(all) => f.debug_tuple("All").field(all).finish(),
            Visibility::Any(any) => f.debug_tuple("Any").field(any).finish(),
        }
    }
}

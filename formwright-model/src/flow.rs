use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What a dynamic flow can see besides the value of its own form.
#[derive(Debug, Clone, Copy)]
pub struct FlowContext<'a> {
    /// The whole configuration value.
    pub root_value: &'a Value,
    /// The value of the enclosing form, if this form is nested.
    pub parent_value: Option<&'a Value>,
    /// Position of the array element this form edits, if any.
    pub element_index: Option<usize>,
}

impl<'a> FlowContext<'a> {
    pub fn root(root_value: &'a Value) -> Self {
        Self {
            root_value,
            parent_value: None,
            element_index: None,
        }
    }
}

type FlowFn = dyn Fn(&Value, &FlowContext<'_>) -> Vec<String> + Send + Sync;

/// Ordered list of field keys to present.
#[derive(Clone)]
pub enum Flow {
    /// Fixed key order, verified against the schema at attach time.
    Static(Vec<String>),
    /// Recomputed after every write from the form value and context.
    Dynamic(Arc<FlowFn>),
}

impl Flow {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Flow::Static(keys.into_iter().map(Into::into).collect())
    }

    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Value, &FlowContext<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        Flow::Dynamic(Arc::new(f))
    }

    /// Returns the static key list, if this flow is static.
    pub fn as_static(&self) -> Option<&[String]> {
        match self {
            Flow::Static(keys) => Some(keys),
            Flow::Dynamic(_) => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Flow::Dynamic(_))
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Static(keys) => f.debug_tuple("Static").field(keys).finish(),
            Flow::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl Default for Flow {
    fn default() -> Self {
        Flow::Static(Vec::new())
    }
}

//! Flow resolution: which keys of a form are presented, in what order.

use formwright_model::{Flow, FlowContext, SubForm};
use serde_json::Value;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Resolves the flow of `form` against `value` (the form's own value).
///
/// Static flows come back exactly as declared; attach already verified them.
/// Dynamic flows are invoked on every call. Keys they return that the schema
/// does not declare are dropped, as are repeats. A dynamic flow that panics
/// falls back to declaration order.
pub fn resolve(form: &SubForm, value: &Value, context: &FlowContext<'_>) -> Vec<String> {
    let flow = match &form.flow {
        Flow::Static(keys) => return keys.clone(),
        Flow::Dynamic(flow) => flow,
    };

    let keys = match catch_unwind(AssertUnwindSafe(|| flow(value, context))) {
        Ok(keys) => keys,
        Err(_) => {
            warn!("dynamic flow panicked, falling back to declaration order");
            return form.schema.keys().map(str::to_string).collect();
        }
    };

    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|key| {
            if !form.schema.contains(key) {
                debug!(key = %key, "dynamic flow returned an undeclared key");
                return false;
            }
            seen.insert(key.clone())
        })
        .collect()
}

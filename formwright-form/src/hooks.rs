use crate::error::{SessionError, SessionResult};
use crate::form::Form;
use formwright_model::{FieldAccess, HookError, ValidationError};
use formwright_store::ValueStore;
use formwright_types::FieldPath;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// What one external edit set in motion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditReport {
    /// Declaration paths of the after-change hooks that ran, in order.
    pub fired_hooks: Vec<String>,
    /// Number of writes those hooks made.
    pub hook_writes: usize,
    /// Validation errors after the edit (empty unless validating on edit).
    pub errors: Vec<ValidationError>,
}

pub(crate) struct HookOutcome {
    pub fired: Vec<String>,
    pub writes: usize,
    /// Declaring fields whose hooks ran and whose writes were applied.
    pub succeeded: Vec<FieldPath>,
    pub errors: Vec<ValidationError>,
}

/// Runs the after-change hooks of every field on the path of `edited`,
/// then of every field on the paths hooks wrote to.
///
/// Each hook runs at most once per call. A failing hook's writes are
/// discarded and its error lands on the declaring field; so are the writes
/// of a hook when any of them cannot be applied. Exceeding `max_writes` is
/// the one failure that aborts the run, before the offending hook's writes
/// touch the store.
pub(crate) fn run_after_change(
    form: &Form,
    store: &mut ValueStore,
    edited: &FieldPath,
    max_writes: usize,
) -> SessionResult<HookOutcome> {
    let mut outcome = HookOutcome {
        fired: Vec::new(),
        writes: 0,
        succeeded: Vec::new(),
        errors: Vec::new(),
    };
    let mut fired = HashSet::new();
    let mut queue = VecDeque::from([edited.clone()]);

    while let Some(path) = queue.pop_front() {
        for located in form.locate(&path) {
            let Some(hook) = &located.field.on_after_change else {
                continue;
            };
            // Element-list hooks are scoped to one element; whole-array writes skip them.
            if located.field.is_element_list() && located.scope.parent().as_ref() != Some(&located.path) {
                continue;
            }
            if !fired.insert(located.schema_key.clone()) {
                continue;
            }

            let current = store.get(&located.path).cloned().unwrap_or(Value::Null);
            let mut access = HookAccess {
                store: &*store,
                scope: located.scope.clone(),
                pending: Vec::new(),
            };
            let result = catch_unwind(AssertUnwindSafe(|| hook(&current, &mut access)))
                .unwrap_or_else(|_| Err(HookError::new("after-change hook panicked")));
            let pending = access.pending;
            outcome.fired.push(located.schema_key.clone());

            let failure = match result {
                Ok(()) => {
                    if outcome.writes + pending.len() > max_writes {
                        warn!(limit = max_writes, hook = %located.schema_key, "hook write limit reached");
                        return Err(SessionError::HookWriteLimit { limit: max_writes });
                    }
                    let mut trial = store.clone();
                    let applied = pending
                        .iter()
                        .try_for_each(|(target, value)| trial.set(target, value.clone()));
                    match applied {
                        Ok(()) => {
                            *store = trial;
                            outcome.writes += pending.len();
                            outcome.succeeded.push(located.path.clone());
                            queue.extend(pending.into_iter().map(|(target, _)| target));
                            None
                        }
                        Err(e) => Some(e.to_string()),
                    }
                }
                Err(e) => Some(e.to_string()),
            };
            if let Some(message) = failure {
                debug!(hook = %located.schema_key, error = %message, "after-change hook failed");
                outcome.errors.push(ValidationError::new(located.path.clone(), message));
            }
        }
    }
    Ok(outcome)
}

struct HookAccess<'s> {
    store: &'s ValueStore,
    scope: FieldPath,
    pending: Vec<(FieldPath, Value)>,
}

impl FieldAccess for HookAccess<'_> {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.scope.join(&FieldPath::parse(key).ok()?);
        self.pending
            .iter()
            .rev()
            .find(|(p, _)| *p == path)
            .map(|(_, v)| v.clone())
            .or_else(|| self.store.get(&path).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), HookError> {
        let relative = FieldPath::parse(key).map_err(|e| HookError::new(e.to_string()))?;
        self.pending.push((self.scope.join(&relative), value));
        Ok(())
    }
}

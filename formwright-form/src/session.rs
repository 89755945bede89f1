use crate::collaborators::{Dialogs, Persistence, PromptOutcome};
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::form::{hydrate, Form};
use crate::hooks::{run_after_change, EditReport};
use crate::render::{collect_errors, render, RenderNode};
use formwright_model::ValidationError;
use formwright_store::{StablePath, ValueStore};
use formwright_types::{ElementId, FieldPath};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// The persisted form of the value equals the last saved (or loaded) one.
    Clean,
    /// The value differs from the baseline, or the last save failed.
    Dirty,
    /// A save is in flight; the write path is closed.
    Saving,
}

struct SessionInner {
    store: ValueStore,
    /// Persisted form of the last loaded or saved value.
    baseline: Arc<Value>,
    saving: bool,
    last_error: Option<String>,
    /// Failed after-change hooks, keyed by the declaring field's path pinned
    /// to element identity so they follow their element through removals
    /// and moves.
    hook_errors: Vec<(StablePath, String)>,
}

impl SessionInner {
    /// Hook errors at the current paths of their fields. Errors whose
    /// element no longer exists are dropped.
    fn resolved_hook_errors(&self) -> Vec<ValidationError> {
        self.hook_errors
            .iter()
            .filter_map(|(at, message)| Some(ValidationError::new(self.store.resolve(at)?, message.clone())))
            .collect()
    }

    fn prune_hook_errors(&mut self) {
        let store = &self.store;
        self.hook_errors.retain(|(at, _)| store.resolve(at).is_some());
    }
}

/// One configuration value being edited through a [`Form`].
///
/// All methods take `&self`; a session can be shared by the presentation
/// layer and whatever drives saving.
pub struct FormSession {
    id: Uuid,
    config_id: String,
    form: Form,
    config: SessionConfig,
    persistence: Arc<dyn Persistence>,
    inner: Mutex<SessionInner>,
}

impl FormSession {
    /// Starts a session on a new value built from the form defaults.
    pub fn create(
        form: Form,
        config_id: impl Into<String>,
        persistence: Arc<dyn Persistence>,
        config: SessionConfig,
    ) -> Self {
        let value = form.default_value();
        Self::with_value(form, config_id, value, persistence, config)
    }

    /// Starts a session on a value loaded from `persistence`.
    pub async fn open(
        form: Form,
        config_id: impl Into<String>,
        persistence: Arc<dyn Persistence>,
        config: SessionConfig,
    ) -> SessionResult<Self> {
        let config_id = config_id.into();
        let value = persistence.load(&config_id).await?;
        Ok(Self::with_value(form, config_id, value, persistence, config))
    }

    /// Starts a session on `value`, which also becomes the baseline.
    pub fn with_value(
        form: Form,
        config_id: impl Into<String>,
        mut value: Value,
        persistence: Arc<dyn Persistence>,
        config: SessionConfig,
    ) -> Self {
        let id = Uuid::new_v4();
        let config_id = config_id.into();
        let baseline = Arc::new(form.strip_synthetic(&value));
        form.hydrate(&mut value);
        debug!(session = %id, config = %config_id, "session opened");
        Self {
            id,
            config_id,
            form,
            config,
            persistence,
            inner: Mutex::new(SessionInner {
                store: ValueStore::new(value),
                baseline,
                saving: false,
                last_error: None,
                hook_errors: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn state(&self) -> SessionState {
        let inner = self.lock();
        if inner.saving {
            SessionState::Saving
        } else if inner.last_error.is_some() || self.differs_from_baseline(&inner) {
            SessionState::Dirty
        } else {
            SessionState::Clean
        }
    }

    /// Message of the last failed save, until a save succeeds or the session is cancelled.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Snapshot of the session value, synthetic fields included.
    pub fn value(&self) -> Arc<Value> {
        self.lock().store.snapshot()
    }

    /// The value as it would be saved.
    pub fn persisted_value(&self) -> Value {
        self.form.strip_synthetic(self.lock().store.value())
    }

    /// The visible field tree for the current value.
    pub fn fields(&self) -> Vec<RenderNode> {
        let inner = self.lock();
        render(&self.form, &inner.store, &inner.resolved_hook_errors())
    }

    /// Every validation error of the visible fields.
    pub fn validate(&self) -> Vec<ValidationError> {
        let inner = self.lock();
        self.validation_errors(&inner)
    }

    /// The presentation layer's write callback.
    pub fn write(&self, path: &str, value: Value) -> SessionResult<EditReport> {
        self.edit(&FieldPath::parse(path)?, value)
    }

    /// Writes `value` at `path`, then runs after-change hooks along the path.
    pub fn edit(&self, path: &FieldPath, value: Value) -> SessionResult<EditReport> {
        let mut inner = self.lock();
        if inner.saving {
            return Err(SessionError::Busy);
        }
        if self.form.locate(path).is_empty() {
            return Err(SessionError::UnknownField(path.clone()));
        }

        let before = inner.store.clone();
        inner.store.set(path, value)?;
        let report = match self.after_write(&mut inner, path) {
            Ok(report) => report,
            Err(e) => {
                inner.store = before;
                return Err(e);
            }
        };
        debug!(session = %self.id, path = %path, hooks = report.fired_hooks.len(), "edit applied");
        Ok(report)
    }

    /// Appends an element to the array at `array_path`. Without a value the
    /// element starts from the element form's defaults.
    pub fn push_element(&self, array_path: &FieldPath, value: Option<Value>) -> SessionResult<ElementId> {
        let mut inner = self.lock();
        if inner.saving {
            return Err(SessionError::Busy);
        }
        let element_form = self
            .form
            .element_form(array_path)
            .ok_or_else(|| SessionError::NotAnElementList(array_path.clone()))?;

        let mut element = value.unwrap_or_else(|| element_form.default_value());
        hydrate(element_form, &mut element);

        let before = inner.store.clone();
        let id = inner.store.push(array_path, element)?;
        let index = inner.store.index_of(array_path, id).unwrap_or_default();
        if let Err(e) = self.after_write(&mut inner, &array_path.index(index)) {
            inner.store = before;
            return Err(e);
        }
        debug!(session = %self.id, path = %array_path, element = %id, "element added");
        Ok(id)
    }

    /// Removes the element with `id` from the array at `array_path`.
    ///
    /// Structural changes do not fire after-change hooks.
    pub fn remove_element(&self, array_path: &FieldPath, id: ElementId) -> SessionResult<Value> {
        let mut inner = self.lock();
        if inner.saving {
            return Err(SessionError::Busy);
        }
        if self.form.element_form(array_path).is_none() {
            return Err(SessionError::NotAnElementList(array_path.clone()));
        }
        let path = inner.store.path_of(array_path, id)?;
        let removed = inner.store.delete(&path)?.unwrap_or(Value::Null);
        inner.prune_hook_errors();
        debug!(session = %self.id, path = %array_path, element = %id, "element removed");
        Ok(removed)
    }

    /// Moves an element, keeping its identity.
    pub fn move_element(&self, array_path: &FieldPath, from: usize, to: usize) -> SessionResult<()> {
        let mut inner = self.lock();
        if inner.saving {
            return Err(SessionError::Busy);
        }
        if self.form.element_form(array_path).is_none() {
            return Err(SessionError::NotAnElementList(array_path.clone()));
        }
        inner.store.move_element(array_path, from, to)?;
        debug!(session = %self.id, path = %array_path, from, to, "element moved");
        Ok(())
    }

    /// Asks for confirmation, then removes the element. Returns whether it was removed.
    pub async fn remove_element_confirmed(
        &self,
        dialogs: &dyn Dialogs,
        array_path: &FieldPath,
        id: ElementId,
    ) -> SessionResult<bool> {
        if !dialogs.confirm(&self.config.confirm_remove_message).await? {
            return Ok(false);
        }
        self.remove_element(array_path, id)?;
        Ok(true)
    }

    /// Prompts for a new element value and appends it unless cancelled.
    pub async fn add_element_prompted(
        &self,
        dialogs: &dyn Dialogs,
        array_path: &FieldPath,
        message: &str,
    ) -> SessionResult<Option<ElementId>> {
        match dialogs.prompt(message, None).await? {
            PromptOutcome::Submitted(value) => Ok(Some(self.push_element(array_path, Some(value))?)),
            PromptOutcome::Cancelled => Ok(None),
        }
    }

    /// Discards the session value and returns to the baseline.
    pub fn cancel(&self) -> SessionResult<()> {
        let mut inner = self.lock();
        if inner.saving {
            return Err(SessionError::Busy);
        }
        let mut value = (*inner.baseline).clone();
        self.form.hydrate(&mut value);
        inner.store.replace(value);
        inner.hook_errors.clear();
        inner.last_error = None;
        debug!(session = %self.id, "edits discarded");
        Ok(())
    }

    /// Validates, then hands the persisted value to the persistence collaborator.
    ///
    /// A second call while one is in flight fails with
    /// [`SessionError::SaveInFlight`] and changes nothing; only the first
    /// call's outcome moves the state. On failure the value is left as it was.
    pub async fn save(&self) -> SessionResult<()> {
        let payload = {
            let mut inner = self.lock();
            if inner.saving {
                return Err(SessionError::SaveInFlight);
            }
            let errors = self.validation_errors(&inner);
            if !errors.is_empty() {
                return Err(SessionError::Invalid(errors));
            }
            inner.saving = true;
            self.form.strip_synthetic(inner.store.value())
        };

        let mut guard = SavingGuard {
            session: self,
            armed: true,
        };
        info!(session = %self.id, config = %self.config_id, "saving configuration");
        let result = self.persistence.save(&self.config_id, &payload).await;

        let mut inner = self.lock();
        guard.armed = false;
        inner.saving = false;
        match result {
            Ok(()) => {
                inner.baseline = Arc::new(payload);
                inner.last_error = None;
                info!(session = %self.id, "configuration saved");
                Ok(())
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "save failed");
                inner.last_error = Some(e.to_string());
                Err(SessionError::Io(e))
            }
        }
    }

    fn after_write(&self, inner: &mut SessionInner, path: &FieldPath) -> SessionResult<EditReport> {
        let outcome = run_after_change(&self.form, &mut inner.store, path, self.config.max_hook_writes)?;
        for declared in &outcome.succeeded {
            if let Some(at) = inner.store.stable_path(declared) {
                inner.hook_errors.retain(|(existing, _)| *existing != at);
            }
        }
        for error in outcome.errors {
            let Some(at) = inner.store.stable_path(&error.path) else {
                continue;
            };
            inner.hook_errors.retain(|(existing, _)| *existing != at);
            inner.hook_errors.push((at, error.message));
        }
        inner.prune_hook_errors();
        let errors = if self.config.validate_on_edit {
            self.validation_errors(inner)
        } else {
            Vec::new()
        };
        Ok(EditReport {
            fired_hooks: outcome.fired,
            hook_writes: outcome.writes,
            errors,
        })
    }

    fn validation_errors(&self, inner: &SessionInner) -> Vec<ValidationError> {
        collect_errors(&render(&self.form, &inner.store, &inner.resolved_hook_errors()))
    }

    fn differs_from_baseline(&self, inner: &SessionInner) -> bool {
        self.form.strip_synthetic(inner.store.value()) != *inner.baseline
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("id", &self.id)
            .field("config_id", &self.config_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Clears the saving flag if a save future is dropped mid-flight.
struct SavingGuard<'a> {
    session: &'a FormSession,
    armed: bool,
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.lock().saving = false;
        }
    }
}

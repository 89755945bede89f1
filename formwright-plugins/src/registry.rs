//! Plugin-id → schema transform map.
//!
//! A transform takes the form generated from a plugin's descriptor and
//! returns its specialized version. Lookups are by exact id; an id without a
//! transform resolves to the generated form unchanged.

use crate::builtins;
use crate::error::PluginResult;
use formwright_model::{Flow, SubForm};
use formwright_types::FieldPath;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Where the form being specialized is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiContext {
    /// Absolute path of the node's value inside the edited configuration.
    pub parent_node: FieldPath,
    /// Whether the presentation layer can open a dedicated designer view.
    pub allow_designer: bool,
}

impl UiContext {
    pub fn at(parent_node: FieldPath) -> Self {
        Self {
            parent_node,
            allow_designer: true,
        }
    }
}

pub type Transform = Arc<dyn Fn(SubForm, &UiContext) -> PluginResult<SubForm> + Send + Sync>;

#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Transform>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every builtin specialization.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Registers `transform` for `plugin_id`, replacing any previous one.
    pub fn register<F>(&mut self, plugin_id: impl Into<String>, transform: F)
    where
        F: Fn(SubForm, &UiContext) -> PluginResult<SubForm> + Send + Sync + 'static,
    {
        let plugin_id = plugin_id.into();
        if self.transforms.insert(plugin_id.clone(), Arc::new(transform)).is_some() {
            debug!(plugin = %plugin_id, "schema transform replaced");
        }
    }

    pub fn contains(&self, plugin_id: &str) -> bool {
        self.transforms.contains_key(plugin_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    /// Applies the transform registered for `plugin_id` to `form`.
    pub fn resolve(&self, plugin_id: &str, form: SubForm, context: &UiContext) -> PluginResult<SubForm> {
        match self.transforms.get(plugin_id) {
            Some(transform) => {
                debug!(plugin = %plugin_id, "applying schema transform");
                transform(form, context)
            }
            None => Ok(form),
        }
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.ids().collect();
        ids.sort_unstable();
        f.debug_struct("TransformRegistry").field("ids", &ids).finish()
    }
}

static GLOBAL: OnceLock<TransformRegistry> = OnceLock::new();

/// The process-wide registry of builtin transforms, built on first use.
pub fn global() -> &'static TransformRegistry {
    GLOBAL.get_or_init(TransformRegistry::with_builtins)
}

/// Adds `front` before and `back` after the keys of `flow`, skipping keys the
/// flow already lists. Dynamic flows are wrapped so the splice applies to
/// every resolution.
pub fn splice(flow: Flow, front: &[&str], back: &[&str]) -> Flow {
    let front: Vec<String> = front.iter().map(|k| k.to_string()).collect();
    let back: Vec<String> = back.iter().map(|k| k.to_string()).collect();
    match flow {
        Flow::Static(keys) => Flow::Static(spliced(keys, &front, &back)),
        Flow::Dynamic(inner) => Flow::dynamic(move |value, context| spliced(inner(value, context), &front, &back)),
    }
}

fn spliced(keys: Vec<String>, front: &[String], back: &[String]) -> Vec<String> {
    let mut out: Vec<String> = front.iter().filter(|k| !keys.contains(k)).cloned().collect();
    let tail: Vec<String> = back.iter().filter(|k| !keys.contains(k)).cloned().collect();
    out.extend(keys);
    out.extend(tail);
    out
}

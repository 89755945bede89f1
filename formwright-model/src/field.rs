use crate::constraint::Constraint;
use crate::error::HookError;
use crate::hooks::{AfterChangeHook, FieldAccess};
use crate::schema::SubForm;
use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One choice of a select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// An option whose label is its value.
    pub fn plain(value: &str) -> Self {
        Self::new(value, value)
    }
}

/// The kind of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Bool,
    Number,
    /// A nested mapping described by the field's `of` form.
    Object,
    /// An array of mappings, each described by the field's `of` form.
    Array,
    Select {
        options: Vec<SelectOption>,
        #[serde(default)]
        creatable: bool,
        /// Several values may be chosen; the value is an array.
        #[serde(default)]
        multi: bool,
    },
    Code {
        mode: String,
    },
    /// Free-form string-to-string mapping.
    Dictionary,
    /// Rendered by a named custom renderer.
    Custom(String),
}

impl FieldKind {
    /// Object and array kinds need a nested form.
    pub fn requires_nested(&self) -> bool {
        matches!(self, FieldKind::Object | FieldKind::Array)
    }

    pub fn name(&self) -> &str {
        match self {
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::Number => "number",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
            FieldKind::Select { .. } => "select",
            FieldKind::Code { .. } => "code",
            FieldKind::Dictionary => "dictionary",
            FieldKind::Custom(name) => name,
        }
    }
}

/// A field default: a constant, or computed from the partially built value.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Computed(Arc<dyn Fn(&Value) -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn resolve(&self, partial: &Value) -> Value {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Computed(f) => f(partial),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Declaration of one field.
#[derive(Clone)]
pub struct FieldSchema {
    pub kind: FieldKind,
    /// Nested form for object and array kinds.
    pub of: Option<Box<SubForm>>,
    /// The value is a list of `kind` (e.g. a list of strings).
    pub is_array: bool,
    pub label: Option<String>,
    pub help: Option<String>,
    pub placeholder: Option<String>,
    pub default: Option<DefaultValue>,
    pub visibility: Visibility,
    pub constraints: Vec<Constraint>,
    pub on_after_change: Option<AfterChangeHook>,
    /// Name of a renderer the presentation layer should use instead. Inert here.
    pub render_override: Option<String>,
    pub disabled: bool,
    /// Presentation-only: kept in the session value, stripped before saving.
    pub synthetic: bool,
}

impl FieldSchema {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            of: None,
            is_array: false,
            label: None,
            help: None,
            placeholder: None,
            default: None,
            visibility: Visibility::Always,
            constraints: Vec::new(),
            on_after_change: None,
            render_override: None,
            disabled: false,
            synthetic: false,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn bool() -> Self {
        Self::new(FieldKind::Bool)
    }

    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    pub fn object(of: SubForm) -> Self {
        Self::new(FieldKind::Object).nested(of)
    }

    pub fn array_of(of: SubForm) -> Self {
        Self::new(FieldKind::Array).nested(of)
    }

    pub fn select(options: Vec<SelectOption>) -> Self {
        Self::new(FieldKind::Select {
            options,
            creatable: false,
            multi: false,
        })
    }

    pub fn code(mode: impl Into<String>) -> Self {
        Self::new(FieldKind::Code { mode: mode.into() })
    }

    pub fn dictionary() -> Self {
        Self::new(FieldKind::Dictionary)
    }

    pub fn custom(renderer: impl Into<String>) -> Self {
        Self::new(FieldKind::Custom(renderer.into()))
    }

    // ── builder ──────────────────────────────────────────────────

    #[must_use]
    pub fn nested(mut self, of: SubForm) -> Self {
        self.of = Some(Box::new(of));
        self
    }

    /// Makes the value a list of this kind.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.is_array = true;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    #[must_use]
    pub fn computed_default<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Computed(Arc::new(f)));
        self
    }

    #[must_use]
    pub fn visible(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn hidden(self) -> Self {
        self.visible(Visibility::Never)
    }

    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn on_after_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &mut dyn FieldAccess) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_after_change = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn render_with(mut self, renderer: impl Into<String>) -> Self {
        self.render_override = Some(renderer.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Nested form, if any.
    pub fn sub_form(&self) -> Option<&SubForm> {
        self.of.as_deref()
    }

    /// Array of objects: each element is edited through the nested form.
    pub fn is_element_list(&self) -> bool {
        self.kind == FieldKind::Array && self.of.is_some()
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("kind", &self.kind)
            .field("of", &self.of)
            .field("is_array", &self.is_array)
            .field("label", &self.label)
            .field("default", &self.default)
            .field("visibility", &self.visibility)
            .field("constraints", &self.constraints)
            .field("on_after_change", &self.on_after_change.is_some())
            .field("render_override", &self.render_override)
            .field("disabled", &self.disabled)
            .field("synthetic", &self.synthetic)
            .finish_non_exhaustive()
    }
}

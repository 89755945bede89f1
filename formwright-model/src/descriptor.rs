//! JSON form descriptors as a backend sends them, and their conversion into
//! the schema model.
//!
//! A descriptor looks like
//! `{"type": "string", "array": true, "label": "Domains"}` or, for nested
//! forms, `{"type": "object", "schema": {...}, "flow": [...]}`. Closures
//! (computed defaults, predicates, hooks) never travel over the wire; they are
//! added afterwards by a schema transform.

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldKind, FieldSchema, SelectOption};
use crate::flow::Flow;
use crate::schema::{Schema, SubForm};
use crate::visibility::Visibility;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a wire flow: a key, or a named group of keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowEntry {
    Key(String),
    Group { name: String, fields: Vec<String> },
}

/// Select option as found on the wire: a bare string or a label/value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum OptionDescriptor {
    Plain(String),
    Labeled { label: String, value: Value },
}

impl From<&OptionDescriptor> for SelectOption {
    fn from(option: &OptionDescriptor) -> Self {
        match option {
            OptionDescriptor::Plain(value) => SelectOption::plain(value),
            OptionDescriptor::Labeled { label, value } => SelectOption::new(label.clone(), value.clone()),
        }
    }
}

/// Presentation properties nested under `props`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<OptionDescriptor>,
}

/// Wire form of a single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub array: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<IndexMap<String, FieldDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<Vec<FlowEntry>>,
    pub props: FieldProps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    pub create_option: bool,
    pub disabled: bool,
}

impl FieldDescriptor {
    /// Converts into a [`FieldSchema`]. `key` is only used in error messages.
    pub fn to_field(&self, key: &str) -> SchemaResult<FieldSchema> {
        let kind_name = self.field_type.as_deref().unwrap_or("string");
        if kind_name.is_empty() {
            return Err(SchemaError::InvalidDescriptor {
                field: key.to_string(),
                reason: "empty type".to_string(),
            });
        }

        let options = || self.props.options.iter().map(SelectOption::from).collect::<Vec<_>>();
        let nested = match &self.schema {
            Some(schema) => Some(form_from(schema, self.flow.as_deref(), key)?),
            None => None,
        };

        let (kind, is_array) = match (kind_name, nested.is_some()) {
            ("object" | "form", true) if self.array => (FieldKind::Array, false),
            ("object" | "form", true) | ("array", true) => {
                let kind = if kind_name == "array" { FieldKind::Array } else { FieldKind::Object };
                (kind, false)
            }
            ("object", false) => (FieldKind::Dictionary, self.array),
            ("array", false) => (FieldKind::String, true),
            ("bool" | "boolean", _) => (FieldKind::Bool, self.array),
            ("number" | "int" | "integer" | "float", _) => (FieldKind::Number, self.array),
            ("select", _) => (
                FieldKind::Select {
                    options: options(),
                    creatable: self.create_option,
                    multi: self.array,
                },
                false,
            ),
            ("array-select", _) => (
                FieldKind::Select {
                    options: options(),
                    creatable: self.create_option,
                    multi: true,
                },
                false,
            ),
            ("code", _) => (
                FieldKind::Code {
                    mode: self.format.clone().unwrap_or_else(|| "javascript".to_string()),
                },
                self.array,
            ),
            ("json", _) => (FieldKind::Code { mode: "json".to_string() }, self.array),
            ("string" | "text", _) => (self.string_kind(&options), self.array),
            (other, _) => (FieldKind::Custom(other.to_string()), self.array),
        };

        let mut field = FieldSchema::new(kind);
        field.is_array = is_array;
        field.label = self.label.clone().or_else(|| self.props.label.clone());
        field.help = self.help.clone().or_else(|| self.props.help.clone());
        field.placeholder = self.placeholder.clone().or_else(|| self.props.placeholder.clone());
        field.disabled = self.disabled;
        if let Some(default) = &self.default_value {
            field = field.default_value(default.clone());
        }
        if self.visible == Some(false) {
            field.visibility = Visibility::Never;
        }
        if field.kind.requires_nested() {
            field.of = nested.map(Box::new);
        }
        Ok(field)
    }

    /// `type: string` refined by `format`.
    fn string_kind(&self, options: &dyn Fn() -> Vec<SelectOption>) -> FieldKind {
        match self.format.as_deref() {
            Some("code") => FieldKind::Code {
                mode: "javascript".to_string(),
            },
            Some("singleLineCode") => FieldKind::Code {
                mode: "single-line".to_string(),
            },
            Some("json") => FieldKind::Code { mode: "json".to_string() },
            Some("select") => FieldKind::Select {
                options: options(),
                creatable: self.create_option,
                multi: false,
            },
            _ => FieldKind::String,
        }
    }
}

/// A plugin as listed by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginDescriptor {
    #[serde(alias = "pluginId")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_visibility: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugin_categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<IndexMap<String, FieldDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_flow: Option<Vec<FlowEntry>>,
}

impl PluginDescriptor {
    /// The generic form derived from `config_schema` / `config_flow`.
    pub fn to_form(&self) -> SchemaResult<SubForm> {
        match &self.config_schema {
            Some(schema) => form_from(schema, self.config_flow.as_deref(), &self.id),
            None => Ok(SubForm::new(Schema::new(), flow_from(self.config_flow.as_deref()))),
        }
    }

    /// Template for a new configuration: `default_config`, else the form defaults.
    pub fn default_config(&self) -> SchemaResult<Value> {
        match &self.default_config {
            Some(config) => Ok(config.clone()),
            None => Ok(self.to_form()?.default_value()),
        }
    }
}

fn form_from(
    schema: &IndexMap<String, FieldDescriptor>,
    flow: Option<&[FlowEntry]>,
    owner: &str,
) -> SchemaResult<SubForm> {
    let mut fields = Schema::new();
    for (key, descriptor) in schema {
        let qualified = format!("{owner}.{key}");
        fields.insert(key.clone(), descriptor.to_field(&qualified)?);
    }
    Ok(match flow {
        Some(_) => SubForm::new(fields, flow_from(flow)),
        None => SubForm::ordered(fields),
    })
}

/// Flattens groups into their keys.
fn flow_from(flow: Option<&[FlowEntry]>) -> Flow {
    let keys = flow.unwrap_or_default().iter().flat_map(|entry| match entry {
        FlowEntry::Key(key) => vec![key.clone()],
        FlowEntry::Group { fields, .. } => fields.clone(),
    });
    Flow::keys(keys)
}

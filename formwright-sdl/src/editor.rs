//! Editing model behind the GraphQL schema side view.
//!
//! [`SchemaEditor`] owns a [`TypeModel`], the currently selected field and the
//! last user-facing error. Structural edits (types, fields) happen here; the
//! selected field itself is edited through the form returned by
//! [`SchemaEditor::field_form`], and written back with
//! [`SchemaEditor::update_field`].

use crate::error::{SdlError, SdlResult};
use crate::model::{is_valid_name, FieldDefinition, TypeDefinition, TypeModel, TypeRef};
use crate::service::SdlService;
use formwright_model::{FieldKind, FieldSchema, Flow, Schema, SelectOption, SubForm};
use serde_json::Value;
use tracing::{debug, warn};

/// Scalar types offered before any user-defined type.
pub const BUILTIN_SCALARS: [&str; 4] = ["Int", "String", "Boolean", "Float"];

/// Directives the field form knows arguments for.
pub const DIRECTIVES: [&str; 8] = [
    "rest",
    "graphql",
    "json",
    "soap",
    "permission",
    "allpermissions",
    "onePermissionsOf",
    "authorize",
];

/// Argument keys shown for a directive, in display order. Unknown directives
/// have no arguments.
pub fn directive_flow(directive: &str) -> &'static [&'static str] {
    match directive {
        "rest" => &["url", "method", "headers", "timeout", "paginate"],
        "graphql" => &[
            "url",
            "query",
            "headers",
            "timeout",
            "method",
            "response_path_arg",
            "response_filter_arg",
        ],
        "json" => &["path"],
        "permission" => &["value", "unauthorized_value"],
        "allpermissions" | "onePermissionsOf" => &["values", "unauthorized_value"],
        "authorize" => &["path", "value", "unauthorized_value"],
        "soap" => &[
            "url",
            "envelope",
            "action",
            "preserve_query",
            "charset",
            "jq_request_filter",
            "jq_response_filter",
        ],
        _ => &[],
    }
}

/// Position of the selected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub type_index: usize,
    pub field_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaEditor {
    model: TypeModel,
    selected: Option<Selection>,
    error: Option<String>,
}

impl SchemaEditor {
    pub fn new(model: TypeModel) -> Self {
        Self {
            model,
            selected: None,
            error: None,
        }
    }

    pub fn model(&self) -> &TypeModel {
        &self.model
    }

    pub fn selected(&self) -> Option<Selection> {
        self.selected
    }

    /// The last load or save failure, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the model with the parsed `sdl` and clears the selection.
    ///
    /// On failure the current model is kept and the error is recorded.
    pub async fn load(&mut self, service: &dyn SdlService, sdl: &str) -> SdlResult<()> {
        let model = self.convert(service, sdl).await?;
        self.model = model;
        self.selected = None;
        Ok(())
    }

    /// Like [`load`](Self::load), but keeps the selection when it still
    /// points at a field of the new model.
    pub async fn reload(&mut self, service: &dyn SdlService, sdl: &str) -> SdlResult<()> {
        let model = self.convert(service, sdl).await?;
        self.model = model;
        self.selected = self.selected.filter(|s| self.field(*s).is_some());
        Ok(())
    }

    async fn convert(&mut self, service: &dyn SdlService, sdl: &str) -> SdlResult<TypeModel> {
        match service.to_model(sdl).await {
            Ok(model) => {
                debug!(types = model.types.len(), "schema loaded");
                self.error = None;
                Ok(model)
            }
            Err(e) => {
                warn!(error = %e, "schema could not be parsed, keeping the current model");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Prints the model through `service`. The model is kept either way.
    pub async fn save(&mut self, service: &dyn SdlService) -> SdlResult<String> {
        match service.to_sdl(&self.model).await {
            Ok(sdl) => {
                self.error = None;
                Ok(sdl)
            }
            Err(e) => {
                warn!(error = %e, "schema could not be printed");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    // ── Types ────────────────────────────────────────────────────

    /// Appends an object type with a single `foo: String` field and selects
    /// that field.
    pub fn create_type(&mut self, name: &str) -> SdlResult<usize> {
        if !is_valid_name(name) {
            return Err(SdlError::InvalidName(name.to_string()));
        }
        if self.model.types.iter().any(|t| t.name == name) {
            return Err(SdlError::DuplicateType(name.to_string()));
        }
        self.model.types.push(TypeDefinition::object(
            name,
            vec![FieldDefinition::new("foo", TypeRef::named("String"))],
        ));
        let type_index = self.model.types.len() - 1;
        self.selected = Some(Selection {
            type_index,
            field_index: 0,
        });
        Ok(type_index)
    }

    pub fn remove_type(&mut self, type_index: usize) -> SdlResult<TypeDefinition> {
        if type_index >= self.model.types.len() {
            return Err(SdlError::NoSuchType(type_index));
        }
        let removed = self.model.types.remove(type_index);
        self.selected = match self.selected {
            Some(s) if s.type_index == type_index => None,
            Some(s) if s.type_index > type_index => Some(Selection {
                type_index: s.type_index - 1,
                ..s
            }),
            other => other,
        };
        Ok(removed)
    }

    // ── Fields ───────────────────────────────────────────────────

    /// Appends a `String` field (not a list) and selects it.
    pub fn create_field(&mut self, type_index: usize, name: &str) -> SdlResult<usize> {
        if !is_valid_name(name) {
            return Err(SdlError::InvalidName(name.to_string()));
        }
        let definition = self
            .model
            .types
            .get_mut(type_index)
            .ok_or(SdlError::NoSuchType(type_index))?;
        definition
            .fields
            .push(FieldDefinition::new(name, TypeRef::named("String")));
        let field_index = definition.fields.len() - 1;
        self.selected = Some(Selection {
            type_index,
            field_index,
        });
        Ok(field_index)
    }

    pub fn remove_field(&mut self, type_index: usize, field_index: usize) -> SdlResult<FieldDefinition> {
        let definition = self
            .model
            .types
            .get_mut(type_index)
            .ok_or(SdlError::NoSuchType(type_index))?;
        if field_index >= definition.fields.len() {
            return Err(SdlError::NoSuchField {
                type_index,
                field_index,
            });
        }
        let removed = definition.fields.remove(field_index);
        self.selected = match self.selected {
            Some(s) if s.type_index == type_index && s.field_index == field_index => None,
            Some(s) if s.type_index == type_index && s.field_index > field_index => Some(Selection {
                field_index: s.field_index - 1,
                ..s
            }),
            other => other,
        };
        Ok(removed)
    }

    pub fn select_field(&mut self, type_index: usize, field_index: usize) -> SdlResult<()> {
        let selection = Selection {
            type_index,
            field_index,
        };
        if self.field(selection).is_none() {
            return Err(if type_index >= self.model.types.len() {
                SdlError::NoSuchType(type_index)
            } else {
                SdlError::NoSuchField {
                    type_index,
                    field_index,
                }
            });
        }
        self.selected = Some(selection);
        Ok(())
    }

    fn field(&self, selection: Selection) -> Option<&FieldDefinition> {
        self.model
            .types
            .get(selection.type_index)?
            .fields
            .get(selection.field_index)
    }

    /// The selected field as the value edited by [`field_form`](Self::field_form).
    pub fn field_value(&self) -> Option<Value> {
        let field = self.field(self.selected?)?;
        serde_json::to_value(field).ok()
    }

    /// Writes an edited field value back into the selected field.
    pub fn update_field(&mut self, value: Value) -> SdlResult<()> {
        let selection = self
            .selected
            .ok_or_else(|| SdlError::InvalidField("no field is selected".to_string()))?;
        let field: FieldDefinition =
            serde_json::from_value(value).map_err(|e| SdlError::InvalidField(e.to_string()))?;
        if !is_valid_name(&field.name) {
            return Err(SdlError::InvalidName(field.name));
        }
        let slot = self
            .model
            .types
            .get_mut(selection.type_index)
            .and_then(|t| t.fields.get_mut(selection.field_index))
            .ok_or(SdlError::NoSuchField {
                type_index: selection.type_index,
                field_index: selection.field_index,
            })?;
        *slot = field;
        Ok(())
    }

    /// Types a field can reference: the builtin scalars, then every other
    /// type except `Query` and the type holding the selected field.
    pub fn type_options(&self) -> Vec<String> {
        let current = self
            .selected
            .and_then(|s| self.model.types.get(s.type_index))
            .map(|t| t.name.as_str());
        BUILTIN_SCALARS
            .iter()
            .map(|s| s.to_string())
            .chain(
                self.model
                    .types
                    .iter()
                    .map(|t| t.name.as_str())
                    .filter(|name| *name != "Query" && Some(*name) != current)
                    .map(str::to_string),
            )
            .collect()
    }

    /// Form for the selected field: name, type, arguments and directives.
    pub fn field_form(&self) -> SubForm {
        let type_select = FieldSchema::new(FieldKind::Select {
            options: self.type_options().iter().map(|t| SelectOption::plain(t)).collect(),
            creatable: true,
            multi: false,
        })
        .label("Type");

        let schema = Schema::new()
            .field("name", FieldSchema::string().label("Name"))
            .field("fieldType", FieldSchema::object(type_ref_form(type_select)).label("Field type"))
            .field(
                "arguments",
                FieldSchema::array_of(SubForm::ordered(
                    Schema::new()
                        .field("name", FieldSchema::string().label("Name"))
                        .field(
                            "valueType",
                            FieldSchema::object(type_ref_form(
                                FieldSchema::select(BUILTIN_SCALARS.iter().map(|s| SelectOption::plain(s)).collect())
                                    .label("Type"),
                            ))
                            .label("Type"),
                        ),
                ))
                .label("Arguments"),
            )
            .field("directives", FieldSchema::array_of(directive_form()).label("Directives"));
        SubForm::ordered(schema)
    }
}

fn type_ref_form(type_select: FieldSchema) -> SubForm {
    SubForm::new(
        Schema::new()
            .field("type", type_select)
            .field("required", FieldSchema::bool().label("Required"))
            .field("isList", FieldSchema::bool().label("Is list")),
        Flow::keys(["type", "required", "isList"]),
    )
}

fn directive_form() -> SubForm {
    let arguments = SubForm::new(
        directive_arguments_schema(),
        Flow::dynamic(|_, ctx| {
            let name = ctx
                .parent_value
                .and_then(|parent| parent.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            directive_flow(name).iter().map(|k| k.to_string()).collect()
        }),
    );
    SubForm::ordered(
        Schema::new()
            .field(
                "name",
                FieldSchema::select(DIRECTIVES.iter().map(|d| SelectOption::plain(d)).collect()).label("Name"),
            )
            .field("arguments", FieldSchema::object(arguments).label("Arguments")),
    )
}

fn directive_arguments_schema() -> Schema {
    Schema::new()
        .field("url", FieldSchema::string().label("URL"))
        .field(
            "method",
            FieldSchema::select(["GET", "POST"].iter().map(|m| SelectOption::plain(m)).collect())
                .label("HTTP method")
                .default_value("GET"),
        )
        .field("headers", FieldSchema::dictionary().label("Headers"))
        .field("timeout", FieldSchema::number().label("Timeout").default_value(5000))
        .field(
            "paginate",
            FieldSchema::bool()
                .label("Pagination")
                .help("Automatically add limit and offset argument")
                .default_value(false),
        )
        .field("query", FieldSchema::code("graphql").label("Query"))
        .field("response_path_arg", FieldSchema::string().label("Response path"))
        .field("response_filter_arg", FieldSchema::string().label("Response filter"))
        .field("path", FieldSchema::string().label("Path"))
        .field("value", FieldSchema::string().label("Value"))
        .field("values", FieldSchema::string().list().label("Values"))
        .field("unauthorized_value", FieldSchema::string().label("Unauthorized value"))
        .field("envelope", FieldSchema::code("xml").label("Envelope"))
        .field("action", FieldSchema::string().label("Action"))
        .field(
            "preserve_query",
            FieldSchema::bool().label("Preserve query").default_value(true),
        )
        .field("charset", FieldSchema::string().label("Charset"))
        .field("jq_request_filter", FieldSchema::string().label("JQ request filter"))
        .field("jq_response_filter", FieldSchema::string().label("JQ response filter"))
}

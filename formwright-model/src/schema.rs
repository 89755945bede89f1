use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldKind, FieldSchema};
use crate::flow::Flow;
use formwright_types::{FieldPath, Segment};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Field declarations of one form, in declaration order.
///
/// Keys are paths relative to the form (`url`, `mtlsConfig.mtls`).
/// Declaration order is the order after-change hooks run in.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema, rejecting duplicate keys.
    pub fn from_fields<I>(fields: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (String, FieldSchema)>,
    {
        let mut schema = Self::new();
        for (key, field) in fields {
            match schema.fields.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(SchemaError::DuplicateField {
                        form: String::new(),
                        key: entry.key().clone(),
                    })
                }
                Entry::Vacant(entry) => {
                    entry.insert(field);
                }
            }
        }
        Ok(schema)
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, field: FieldSchema) -> Self {
        self.insert(key, field);
        self
    }

    /// Declares `key`, replacing an existing declaration in place.
    pub fn insert(&mut self, key: impl Into<String>, field: FieldSchema) -> Option<FieldSchema> {
        self.fields.insert(key.into(), field)
    }

    /// Declares `key` ahead of every other field.
    pub fn insert_first(&mut self, key: impl Into<String>, field: FieldSchema) {
        self.fields.shift_insert(0, key.into(), field);
    }

    pub fn get(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldSchema> {
        self.fields.get_mut(key)
    }

    /// Removes `key`, keeping the order of the remaining fields.
    pub fn remove(&mut self, key: &str) -> Option<FieldSchema> {
        self.fields.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut FieldSchema)> {
        self.fields.iter_mut().map(|(k, f)| (k.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The value a "new" form starts from.
    ///
    /// Fields with a default get it (computed defaults see the value built
    /// so far at this level); object fields without one get their nested
    /// defaults when those are non-empty. Everything else is left absent.
    pub fn default_value(&self) -> Value {
        let mut out = Value::Object(Map::new());
        for (key, field) in &self.fields {
            let value = match (&field.default, field.sub_form()) {
                (Some(default), _) => Some(default.resolve(&out)),
                (None, Some(of)) if field.kind == FieldKind::Object => {
                    let nested = of.default_value();
                    nested.as_object().is_some_and(|m| !m.is_empty()).then_some(nested)
                }
                _ => None,
            };
            if let (Some(value), Ok(path)) = (value, FieldPath::parse(key)) {
                insert_at(&mut out, &path, value);
            }
        }
        out
    }
}

/// A schema plus the flow that presents it.
#[derive(Debug, Clone, Default)]
pub struct SubForm {
    pub schema: Schema,
    pub flow: Flow,
}

impl SubForm {
    pub fn new(schema: Schema, flow: Flow) -> Self {
        Self { schema, flow }
    }

    /// A form whose flow lists every field in declaration order.
    pub fn ordered(schema: Schema) -> Self {
        let flow = Flow::keys(schema.keys());
        Self { schema, flow }
    }

    pub fn default_value(&self) -> Value {
        self.schema.default_value()
    }

    /// Checks the whole form tree: field keys parse, object/array fields
    /// carry a nested form, static flows name declared fields exactly once.
    pub fn validate(&self) -> SchemaResult<()> {
        self.validate_at("")
    }

    fn validate_at(&self, form: &str) -> SchemaResult<()> {
        for (key, field) in self.schema.iter() {
            let qualified = qualify(form, key);
            check_key(key)?;
            if field.kind.requires_nested() && field.of.is_none() {
                return Err(SchemaError::MissingNestedSchema {
                    field: qualified,
                    kind: field.kind.name().to_string(),
                });
            }
            if let Some(of) = field.sub_form() {
                of.validate_at(&qualified)?;
            }
        }

        if let Flow::Static(keys) = &self.flow {
            let mut seen = HashSet::new();
            for key in keys {
                if !self.schema.contains(key) {
                    return Err(SchemaError::UnknownFlowKey {
                        form: display_form(form),
                        key: key.clone(),
                    });
                }
                if !seen.insert(key.as_str()) {
                    return Err(SchemaError::DuplicateFlowKey {
                        form: display_form(form),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn qualify(form: &str, key: &str) -> String {
    if form.is_empty() {
        key.to_string()
    } else {
        format!("{form}.{key}")
    }
}

fn display_form(form: &str) -> String {
    if form.is_empty() {
        "<root>".to_string()
    } else {
        form.to_string()
    }
}

fn check_key(key: &str) -> SchemaResult<()> {
    let invalid = |reason: String| SchemaError::InvalidPath {
        key: key.to_string(),
        reason,
    };
    let path = FieldPath::parse(key).map_err(|e| invalid(e.to_string()))?;
    if path.is_root() {
        return Err(invalid("empty key".to_string()));
    }
    if path.segments().iter().any(|s| matches!(s, Segment::Index(_))) {
        return Err(invalid("field keys cannot contain indices".to_string()));
    }
    Ok(())
}

/// Writes `value` under a key-only path, creating mappings on the way.
fn insert_at(target: &mut Value, path: &FieldPath, value: Value) {
    let keys: Vec<&str> = path.segments().iter().filter_map(Segment::as_key).collect();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut current = target;
    for key in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert((*last).to_string(), value);
    }
}

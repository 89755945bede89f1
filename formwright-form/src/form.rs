use formwright_model::{FieldKind, FieldSchema, SchemaResult, SubForm};
use formwright_types::{FieldPath, Segment};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// A schema tree that passed attach-time checks.
///
/// Cheap to clone; the tree is shared.
#[derive(Debug, Clone)]
pub struct Form {
    root: Arc<SubForm>,
}

/// One field declaration found along an edit path.
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub key: &'a str,
    pub field: &'a FieldSchema,
    /// Absolute path of the field's value.
    pub path: FieldPath,
    /// Base that after-change hooks of this field read and write relative to.
    pub scope: FieldPath,
    /// Dotted declaration path without indices (`backend.targets`).
    pub schema_key: String,
}

impl Form {
    /// Checks `root` and wraps it. Every structural problem surfaces here.
    pub fn attach(root: SubForm) -> SchemaResult<Self> {
        root.validate()?;
        debug!(fields = root.schema.len(), dynamic_flow = root.flow.is_dynamic(), "form attached");
        Ok(Self { root: Arc::new(root) })
    }

    pub fn root(&self) -> &SubForm {
        &self.root
    }

    /// The value a new configuration starts from, synthetic fields included.
    pub fn default_value(&self) -> Value {
        let mut value = self.root.default_value();
        hydrate(&self.root, &mut value);
        value
    }

    /// Fills in absent synthetic fields from their defaults, at every level.
    pub fn hydrate(&self, value: &mut Value) {
        hydrate(&self.root, value);
    }

    /// The declarations an edit at `path` lands on or under, outermost first.
    ///
    /// At each level the field with the longest key matching the path wins,
    /// so `mtlsConfig.mtls` beats `mtlsConfig`.
    pub fn locate(&self, path: &FieldPath) -> Vec<Located<'_>> {
        let mut out = Vec::new();
        locate_in(&self.root, FieldPath::root(), path.segments(), "", &mut out);
        out
    }

    /// The field declared exactly at `path`, if any.
    pub fn field_at(&self, path: &FieldPath) -> Option<&FieldSchema> {
        self.locate(path)
            .into_iter()
            .last()
            .filter(|located| located.path == *path)
            .map(|located| located.field)
    }

    /// The nested form edited for each element of the array at `path`.
    pub fn element_form(&self, path: &FieldPath) -> Option<&SubForm> {
        self.field_at(path)
            .filter(|field| field.is_element_list())
            .and_then(FieldSchema::sub_form)
    }

    /// `value` without synthetic fields, i.e. what gets persisted.
    pub fn strip_synthetic(&self, value: &Value) -> Value {
        let mut out = value.clone();
        strip(&self.root, &mut out);
        out
    }
}

fn locate_in<'a>(form: &'a SubForm, scope: FieldPath, rest: &[Segment], prefix: &str, out: &mut Vec<Located<'a>>) {
    let mut best: Option<(&'a str, &'a FieldSchema, FieldPath)> = None;
    for (key, field) in form.schema.iter() {
        let Ok(key_path) = FieldPath::parse(key) else {
            continue;
        };
        let longer = best.as_ref().is_none_or(|(_, _, b)| key_path.len() > b.len());
        if longer && rest.starts_with(key_path.segments()) {
            best = Some((key, field, key_path));
        }
    }
    let Some((key, field, key_path)) = best else {
        return;
    };

    let path = scope.join(&key_path);
    let remaining = &rest[key_path.len()..];
    let schema_key = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    };

    match (field.sub_form(), &field.kind) {
        (Some(of), FieldKind::Array) => match remaining.split_first() {
            Some((Segment::Index(index), tail)) => {
                let element = path.index(*index);
                out.push(Located {
                    key,
                    field,
                    path,
                    scope: element.clone(),
                    schema_key: schema_key.clone(),
                });
                locate_in(of, element, tail, &schema_key, out);
            }
            _ => out.push(Located {
                key,
                field,
                path,
                scope,
                schema_key,
            }),
        },
        (Some(of), _) => {
            out.push(Located {
                key,
                field,
                path: path.clone(),
                scope: path.clone(),
                schema_key: schema_key.clone(),
            });
            locate_in(of, path, remaining, &schema_key, out);
        }
        (None, _) => out.push(Located {
            key,
            field,
            path,
            scope,
            schema_key,
        }),
    }
}

/// Fills in absent synthetic fields of `value`, edited through `form`.
pub(crate) fn hydrate(form: &SubForm, value: &mut Value) {
    if !value.is_object() {
        return;
    }
    for (key, field) in form.schema.iter() {
        let Ok(key_path) = FieldPath::parse(key) else {
            continue;
        };
        if field.synthetic && get_keys(value, &key_path).is_none() {
            if let Some(default) = &field.default {
                let computed = default.resolve(value);
                set_keys(value, &key_path, computed);
            }
        }
        let Some(of) = field.sub_form() else {
            continue;
        };
        match get_keys_mut(value, &key_path) {
            Some(Value::Array(items)) if field.kind == FieldKind::Array => {
                items.iter_mut().for_each(|item| hydrate(of, item));
            }
            Some(child) if field.kind == FieldKind::Object => hydrate(of, child),
            _ => {}
        }
    }
}

fn strip(form: &SubForm, value: &mut Value) {
    for (key, field) in form.schema.iter() {
        let Ok(key_path) = FieldPath::parse(key) else {
            continue;
        };
        if field.synthetic {
            remove_keys(value, &key_path);
            continue;
        }
        let Some(of) = field.sub_form() else {
            continue;
        };
        match get_keys_mut(value, &key_path) {
            Some(Value::Array(items)) if field.kind == FieldKind::Array => {
                items.iter_mut().for_each(|item| strip(of, item));
            }
            Some(child) if field.kind == FieldKind::Object => strip(of, child),
            _ => {}
        }
    }
}

// Field keys contain only key segments, so these helpers ignore indices.

fn get_keys<'v>(value: &'v Value, path: &FieldPath) -> Option<&'v Value> {
    path.segments()
        .iter()
        .filter_map(Segment::as_key)
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

fn get_keys_mut<'v>(value: &'v mut Value, path: &FieldPath) -> Option<&'v mut Value> {
    path.segments()
        .iter()
        .filter_map(Segment::as_key)
        .try_fold(value, |current, key| current.as_object_mut()?.get_mut(key))
}

fn set_keys(value: &mut Value, path: &FieldPath, new: Value) {
    let keys: Vec<&str> = path.segments().iter().filter_map(Segment::as_key).collect();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut current = value;
    for key in parents {
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Value::Object(map) = current {
        map.insert((*last).to_string(), new);
    }
}

fn remove_keys(value: &mut Value, path: &FieldPath) {
    let Some(parent) = path.parent() else {
        return;
    };
    if let (Some(Value::Object(map)), Some(Segment::Key(last))) = (get_keys_mut(value, &parent), path.last()) {
        map.remove(last);
    }
}

use crate::flow;
use crate::form::Form;
use crate::visibility::{is_visible, EvalScope};
use formwright_model::{FieldKind, FlowContext, SubForm, ValidationError};
use formwright_store::ValueStore;
use formwright_types::{ElementId, FieldPath};
use serde::Serialize;
use serde_json::Value;

static NULL: Value = Value::Null;

/// One visible field, ready for a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub key: String,
    pub path: FieldPath,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub is_array: bool,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_override: Option<String>,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub children: Children,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Children {
    None,
    /// Fields of a nested object.
    Fields(Vec<RenderNode>),
    /// One entry per array element, in order.
    Elements(Vec<RenderElement>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderElement {
    pub id: ElementId,
    pub index: usize,
    pub fields: Vec<RenderNode>,
}

impl RenderNode {
    /// Finds a node by key among `nodes`.
    pub fn find<'n>(nodes: &'n [RenderNode], key: &str) -> Option<&'n RenderNode> {
        nodes.iter().find(|node| node.key == key)
    }

    /// Keys of `nodes`, in order.
    pub fn keys(nodes: &[RenderNode]) -> Vec<&str> {
        nodes.iter().map(|node| node.key.as_str()).collect()
    }
}

/// Resolves flow and visibility for the whole form against the store.
///
/// Constraint failures of visible fields, and hook failures recorded for
/// them, are attached to the nodes as `errors`.
pub fn render(form: &Form, store: &ValueStore, hook_errors: &[ValidationError]) -> Vec<RenderNode> {
    let root = store.value();
    let walker = Walker { store, hook_errors };
    walker.form(form.root(), &FieldPath::root(), root, FlowContext::root(root))
}

/// Flattens node errors into validation errors, depth first.
pub fn collect_errors(nodes: &[RenderNode]) -> Vec<ValidationError> {
    let mut out = Vec::new();
    collect_into(nodes, &mut out);
    out
}

fn collect_into(nodes: &[RenderNode], out: &mut Vec<ValidationError>) {
    for node in nodes {
        out.extend(
            node.errors
                .iter()
                .map(|message| ValidationError::new(node.path.clone(), message.clone())),
        );
        match &node.children {
            Children::None => {}
            Children::Fields(fields) => collect_into(fields, out),
            Children::Elements(elements) => elements.iter().for_each(|e| collect_into(&e.fields, out)),
        }
    }
}

struct Walker<'a> {
    store: &'a ValueStore,
    hook_errors: &'a [ValidationError],
}

impl<'a> Walker<'a> {
    fn form(&self, form: &SubForm, scope: &FieldPath, value: &'a Value, context: FlowContext<'a>) -> Vec<RenderNode> {
        let eval = EvalScope {
            root: context.root_value,
            form_value: value,
            element_index: context.element_index,
        };

        flow::resolve(form, value, &context)
            .into_iter()
            .filter_map(|key| {
                let field = form.schema.get(&key)?;
                if !is_visible(field, &eval) {
                    return None;
                }
                let path = scope.join(&FieldPath::parse(&key).ok()?);
                let field_value = self.store.get(&path).unwrap_or(&NULL);

                let children = match (field.sub_form(), &field.kind) {
                    (Some(of), FieldKind::Array) => {
                        let items = field_value.as_array().map(Vec::as_slice).unwrap_or_default();
                        let elements = items
                            .iter()
                            .enumerate()
                            .map(|(index, item)| {
                                let element_path = path.index(index);
                                let context = FlowContext {
                                    root_value: context.root_value,
                                    parent_value: Some(value),
                                    element_index: Some(index),
                                };
                                RenderElement {
                                    id: self.store.element_id(&path, index).unwrap_or_default(),
                                    index,
                                    fields: self.form(of, &element_path, item, context),
                                }
                            })
                            .collect();
                        Children::Elements(elements)
                    }
                    (Some(of), _) => {
                        let context = FlowContext {
                            root_value: context.root_value,
                            parent_value: Some(value),
                            element_index: context.element_index,
                        };
                        Children::Fields(self.form(of, &path, field_value, context))
                    }
                    (None, _) => Children::None,
                };

                let mut errors: Vec<String> = field
                    .constraints
                    .iter()
                    .filter(|c| !c.check(field_value))
                    .map(|c| c.message.clone())
                    .collect();
                errors.extend(
                    self.hook_errors
                        .iter()
                        .filter(|e| e.path == path)
                        .map(|e| e.message.clone()),
                );

                Some(RenderNode {
                    key,
                    kind: field.kind.clone(),
                    label: field.label.clone(),
                    help: field.help.clone(),
                    placeholder: field.placeholder.clone(),
                    is_array: field.is_array,
                    value: field_value.clone(),
                    render_override: field.render_override.clone(),
                    disabled: field.disabled,
                    errors,
                    children,
                    path,
                })
            })
            .collect()
    }
}

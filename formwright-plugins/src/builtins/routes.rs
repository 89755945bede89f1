//! Route node forms: the Frontend (how requests are matched) and the
//! Backend (where they are sent).
//!
//! Backend targets are shown collapsed as a one-line summary,
//! `scheme://host:port`, kept in the synthetic `custom_target` field. A
//! trailing space on the summary marks the target as expanded; the other
//! target fields are only visible while it is there.

use crate::error::{PluginError, PluginResult};
use crate::registry::{splice, UiContext};
use formwright_model::{
    Constraint, FieldAccess, FieldKind, FieldSchema, Flow, HookError, PredicateError, SelectOption, SubForm,
    Visibility,
};
use formwright_form::visibility::truthy;
use serde_json::Value;
use std::sync::Arc;

pub const FRONTEND_FLOW: &[&str] = &["domains", "strip_path", "exact", "headers", "methods", "query"];

pub const BACKEND_FLOW: &[&str] = &[
    "root",
    "targets",
    "health_check",
    "target_refs",
    "client",
    "rewrite",
    "load_balancing",
];

const HTTP_METHODS: &[&str] = &["GET", "HEAD", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"];

const HOSTNAME_BLACKLIST: &[&str] = &["http:", "https:", "tcp:", "udp:", "/"];

pub const HOSTNAME_BLACKLIST_MESSAGE: &str = "You cannot use protocol scheme or / in the Host name";

const EXPANDED_MARKER: char = ' ';

pub(super) fn frontend(mut form: SubForm, _context: &UiContext) -> PluginResult<SubForm> {
    form.schema
        .insert("domains", FieldSchema::string().list().label("Domains"));
    let methods = HTTP_METHODS.iter().map(|m| SelectOption::new(*m, *m)).collect();
    form.schema.insert(
        "methods",
        FieldSchema::new(FieldKind::Select {
            options: methods,
            creatable: false,
            multi: true,
        })
        .label("Methods"),
    );
    form.flow = declared_flow(&form, FRONTEND_FLOW);
    Ok(form)
}

pub(super) fn backend(mut form: SubForm, context: &UiContext) -> PluginResult<SubForm> {
    let missing = |field: &str| PluginError::MissingField {
        plugin: super::BACKEND.to_string(),
        field: field.to_string(),
    };
    let targets = form.schema.get_mut("targets").ok_or_else(|| missing("targets"))?;
    if !targets.is_element_list() {
        return Err(missing("targets.schema"));
    }
    let target = targets.of.as_deref_mut().ok_or_else(|| missing("targets.schema"))?;

    for (_, field) in target.schema.iter_mut() {
        field.visibility = expanded_only(context);
    }
    if let Some(hostname) = target.schema.get_mut("hostname") {
        hostname
            .constraints
            .push(Constraint::blacklist(HOSTNAME_BLACKLIST.iter().copied(), HOSTNAME_BLACKLIST_MESSAGE));
    }
    target.schema.insert_first(
        "custom_target",
        FieldSchema::string()
            .label("Target")
            .disabled()
            .synthetic()
            .render_with("target-summary")
            .computed_default(|target| Value::String(target_summary(target, false))),
    );
    target.flow = splice(std::mem::take(&mut target.flow), &["custom_target"], &[]);

    targets.on_after_change = Some(Arc::new(refresh_summary));

    form.flow = declared_flow(&form, BACKEND_FLOW);
    Ok(form)
}

/// `scheme://host[:port]` for a target value, with the expanded marker
/// appended when `expanded`.
pub fn target_summary(target: &Value, expanded: bool) -> String {
    summary_of(
        target.get("tls").unwrap_or(&Value::Null),
        target.get("hostname").unwrap_or(&Value::Null),
        target.get("port").unwrap_or(&Value::Null),
        expanded,
    )
}

fn summary_of(tls: &Value, hostname: &Value, port: &Value, expanded: bool) -> String {
    let scheme = if truthy(tls) { "https" } else { "http" };
    let hostname = hostname.as_str().unwrap_or_default();
    let port = match port {
        Value::String(s) if !s.is_empty() => format!(":{s}"),
        Value::Number(n) if n.as_f64().is_some_and(|n| n != 0.0) => format!(":{n}"),
        _ => String::new(),
    };
    let marker = if expanded { " " } else { "" };
    format!("{scheme}://{hostname}{port}{marker}")
}

/// Recomputes the target summary, keeping the expanded marker.
fn refresh_summary(_targets: &Value, access: &mut dyn FieldAccess) -> Result<(), HookError> {
    let field = |name: &str| access.get(name).unwrap_or(Value::Null);
    let expanded = field("custom_target")
        .as_str()
        .is_some_and(|s| s.ends_with(EXPANDED_MARKER));
    let summary = summary_of(&field("tls"), &field("hostname"), &field("port"), expanded);
    access.set("custom_target", Value::String(summary))
}

fn expanded_only(context: &UiContext) -> Visibility {
    Visibility::element(context.parent_node.clone(), |node, index| {
        let Some(target) = node.get("targets").and_then(|t| t.get(index)) else {
            return Ok(false);
        };
        let summary = target
            .get("custom_target")
            .and_then(Value::as_str)
            .ok_or_else(|| PredicateError::missing("custom_target"))?;
        Ok(summary.ends_with(EXPANDED_MARKER))
    })
}

/// `keys` restricted to the fields `form` declares.
fn declared_flow(form: &SubForm, keys: &[&str]) -> Flow {
    Flow::keys(keys.iter().copied().filter(|key| form.schema.contains(key)))
}

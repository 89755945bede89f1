use formwright_form::{Children, Form, FormSession, InMemoryPersistence, RenderNode, SessionConfig, SessionState};
use formwright_model::{FieldSchema, Schema, SubForm};
use formwright_plugins::builtins::{BACKEND, HOSTNAME_BLACKLIST_MESSAGE};
use formwright_plugins::{global, UiContext};
use formwright_types::FieldPath;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn path(s: &str) -> FieldPath {
    FieldPath::parse(s).unwrap()
}

/// The backend node form as generated from the route descriptor.
fn generated_backend() -> SubForm {
    let target = SubForm::ordered(
        Schema::new()
            .field("hostname", FieldSchema::string().label("Hostname"))
            .field("port", FieldSchema::number().label("Port"))
            .field("tls", FieldSchema::bool().label("TLS"))
            .field("weight", FieldSchema::number().default_value(1)),
    );
    SubForm::ordered(
        Schema::new()
            .field("rewrite", FieldSchema::bool())
            .field("root", FieldSchema::string().default_value("/"))
            .field("targets", FieldSchema::array_of(target)),
    )
}

fn backend_session(value: Value) -> FormSession {
    let form = global()
        .resolve(BACKEND, generated_backend(), &UiContext::at(FieldPath::root()))
        .unwrap();
    let form = Form::attach(form).unwrap();
    FormSession::with_value(
        form,
        "route-1",
        value,
        Arc::new(InMemoryPersistence::new()),
        SessionConfig::default(),
    )
}

fn mirror() -> Value {
    json!({
        "root": "/",
        "rewrite": false,
        "targets": [{ "hostname": "mirror.otoroshi.io", "port": 443, "tls": true, "weight": 1 }]
    })
}

fn target_keys(session: &FormSession, index: usize) -> Vec<String> {
    let fields = session.fields();
    let Children::Elements(elements) = &RenderNode::find(&fields, "targets").unwrap().children else {
        panic!("targets renders elements");
    };
    elements[index].fields.iter().map(|f| f.key.clone()).collect()
}

// ── Collapsed summary ────────────────────────────────────────────

#[test]
fn targets_open_collapsed_with_a_summary() {
    let session = backend_session(mirror());
    assert_eq!(
        session.value()["targets"][0]["custom_target"],
        json!("https://mirror.otoroshi.io:443")
    );
    assert_eq!(target_keys(&session, 0), vec!["custom_target"]);
    assert_eq!(session.persisted_value(), mirror());
    assert_eq!(session.state(), SessionState::Clean);
}

#[test]
fn node_flow_follows_the_route_layout() {
    let session = backend_session(mirror());
    assert_eq!(RenderNode::keys(&session.fields()), vec!["root", "targets", "rewrite"]);
}

#[test]
fn summary_field_is_disabled_and_custom_rendered() {
    let session = backend_session(mirror());
    let fields = session.fields();
    let Children::Elements(elements) = &fields[1].children else {
        panic!("targets renders elements");
    };
    let summary = &elements[0].fields[0];
    assert!(summary.disabled);
    assert_eq!(summary.render_override.as_deref(), Some("target-summary"));
}

// ── Expansion marker ─────────────────────────────────────────────

#[test]
fn toggling_the_marker_expands_without_dirtying() {
    let session = backend_session(mirror());
    session
        .write("targets[0].custom_target", json!("https://mirror.otoroshi.io:443 "))
        .unwrap();

    assert_eq!(
        session.value()["targets"][0]["custom_target"],
        json!("https://mirror.otoroshi.io:443 ")
    );
    assert_eq!(
        target_keys(&session, 0),
        vec!["custom_target", "hostname", "port", "tls", "weight"]
    );
    assert_eq!(session.persisted_value(), mirror());
    assert_eq!(session.state(), SessionState::Clean);

    session
        .write("targets[0].custom_target", json!("https://mirror.otoroshi.io:443"))
        .unwrap();
    assert_eq!(target_keys(&session, 0), vec!["custom_target"]);
}

#[test]
fn editing_an_expanded_target_keeps_it_expanded() {
    let session = backend_session(mirror());
    session
        .write("targets[0].custom_target", json!("https://mirror.otoroshi.io:443 "))
        .unwrap();

    let report = session.write("targets[0].hostname", json!("api.local")).unwrap();
    assert_eq!(report.fired_hooks, vec!["targets"]);
    assert_eq!(session.value()["targets"][0]["custom_target"], json!("https://api.local:443 "));

    session.write("targets[0].tls", json!(false)).unwrap();
    session.write("targets[0].port", Value::Null).unwrap();
    assert_eq!(session.value()["targets"][0]["custom_target"], json!("http://api.local "));
    assert_eq!(session.state(), SessionState::Dirty);
}

#[test]
fn each_target_expands_independently() {
    let mut value = mirror();
    value["targets"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "hostname": "backup.local", "port": 8080, "tls": false }));
    let session = backend_session(value);
    session
        .write("targets[1].custom_target", json!("http://backup.local:8080 "))
        .unwrap();
    assert_eq!(target_keys(&session, 0), vec!["custom_target"]);
    assert_eq!(target_keys(&session, 1).len(), 5);
}

// ── Host name rule ───────────────────────────────────────────────

#[test]
fn host_names_reject_schemes_and_slashes() {
    let session = backend_session(mirror());
    session
        .write("targets[0].custom_target", json!("https://mirror.otoroshi.io:443 "))
        .unwrap();
    let report = session.write("targets[0].hostname", json!("https://mirror.otoroshi.io")).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].path, path("targets[0].hostname"));
    assert_eq!(report.errors[0].message, HOSTNAME_BLACKLIST_MESSAGE);
}

#[test]
fn collapsed_targets_are_not_validated() {
    let session = backend_session(mirror());
    session.write("targets[0].hostname", json!("a/b")).unwrap();
    assert!(session.validate().is_empty());
}

// ── New targets ──────────────────────────────────────────────────

#[test]
fn pushed_targets_get_a_summary() {
    let session = backend_session(mirror());
    let targets = path("targets");
    session
        .push_element(&targets, Some(json!({ "hostname": "new.local", "port": 80, "tls": false })))
        .unwrap();
    assert_eq!(session.value()["targets"][1]["custom_target"], json!("http://new.local:80"));

    session.push_element(&targets, None).unwrap();
    assert_eq!(session.value()["targets"][2]["custom_target"], json!("http://"));
    assert_eq!(session.value()["targets"][2]["weight"], json!(1));
}

#[test]
fn nested_nodes_read_targets_under_their_parent() {
    let form = global()
        .resolve(BACKEND, generated_backend(), &UiContext::at(path("backend")))
        .unwrap();
    let form = Form::attach(SubForm::ordered(
        Schema::new().field("backend", FieldSchema::object(form)),
    ))
    .unwrap();
    let session = FormSession::with_value(
        form,
        "route-2",
        json!({ "backend": mirror() }),
        Arc::new(InMemoryPersistence::new()),
        SessionConfig::default(),
    );
    session
        .write("backend.targets[0].custom_target", json!("https://mirror.otoroshi.io:443 "))
        .unwrap();

    let fields = session.fields();
    let Children::Fields(backend) = &fields[0].children else {
        panic!("backend renders fields");
    };
    let Children::Elements(elements) = &RenderNode::find(backend, "targets").unwrap().children else {
        panic!("targets renders elements");
    };
    assert_eq!(elements[0].fields.len(), 5);
}

use formwright_form::{render, Children, Form, RenderNode};
use formwright_model::{Constraint, FieldSchema, Flow, Schema, SelectOption, SubForm, ValidationError, Visibility};
use formwright_store::ValueStore;
use formwright_types::FieldPath;
use pretty_assertions::assert_eq;
use serde_json::json;

fn path(s: &str) -> FieldPath {
    FieldPath::parse(s).unwrap()
}

/// Exporter form: `type` picks which nested config fields are shown.
fn exporter_form() -> Form {
    let config = SubForm::new(
        Schema::new()
            .field("clusterUri", FieldSchema::string().label("Cluster URI"))
            .field("index", FieldSchema::string().label("Index"))
            .field("mtlsConfig.mtls", FieldSchema::bool().label("Use mTLS"))
            .field("url", FieldSchema::string().label("Alerts hook URL"))
            .field("headers", FieldSchema::dictionary()),
        Flow::dynamic(|_, ctx| {
            let keys: &[&str] = match ctx.root_value["type"].as_str() {
                Some("elastic") => &["clusterUri", "index", "mtlsConfig.mtls"],
                Some("webhook") => &["url", "headers"],
                _ => &[],
            };
            keys.iter().map(|k| k.to_string()).collect()
        }),
    );
    Form::attach(SubForm::new(
        Schema::new()
            .field(
                "type",
                FieldSchema::select(vec![SelectOption::plain("elastic"), SelectOption::plain("webhook")]),
            )
            .field("eventsFilters", FieldSchema::string().list())
            .field("config", FieldSchema::object(config)),
        Flow::keys(["type", "eventsFilters", "config"]),
    ))
    .unwrap()
}

fn config_keys(nodes: &[RenderNode]) -> Vec<String> {
    match &RenderNode::find(nodes, "config").unwrap().children {
        Children::Fields(fields) => fields.iter().map(|f| f.key.clone()).collect(),
        other => panic!("expected nested fields, got {other:?}"),
    }
}

// ── Nested dynamic forms ─────────────────────────────────────────

#[test]
fn selecting_elastic_reveals_its_fields_and_keeps_filters() {
    let form = exporter_form();
    let mut store = ValueStore::new(json!({ "eventsFilters": ["AlertEvent", "GatewayEvent"] }));
    assert!(config_keys(&render(&form, &store, &[])).is_empty());

    store.set(&path("type"), json!("elastic")).unwrap();
    let nodes = render(&form, &store, &[]);
    assert_eq!(RenderNode::keys(&nodes), vec!["type", "eventsFilters", "config"]);
    assert_eq!(config_keys(&nodes), vec!["clusterUri", "index", "mtlsConfig.mtls"]);
    assert_eq!(
        RenderNode::find(&nodes, "eventsFilters").unwrap().value,
        json!(["AlertEvent", "GatewayEvent"])
    );
}

#[test]
fn dotted_keys_address_nested_values() {
    let form = exporter_form();
    let store = ValueStore::new(json!({ "type": "elastic", "config": { "mtlsConfig": { "mtls": true } } }));
    let nodes = render(&form, &store, &[]);
    let Children::Fields(config) = &RenderNode::find(&nodes, "config").unwrap().children else {
        panic!("config has nested fields");
    };
    let mtls = RenderNode::find(config, "mtlsConfig.mtls").unwrap();
    assert_eq!(mtls.path, path("config.mtlsConfig.mtls"));
    assert_eq!(mtls.value, json!(true));
    assert_eq!(mtls.label.as_deref(), Some("Use mTLS"));
}

#[test]
fn missing_values_render_as_null() {
    let form = exporter_form();
    let store = ValueStore::default();
    let nodes = render(&form, &store, &[]);
    assert_eq!(RenderNode::find(&nodes, "type").unwrap().value, json!(null));
}

// ── Visibility and constraints ───────────────────────────────────

fn user_form() -> Form {
    Form::attach(SubForm::ordered(
        Schema::new()
            .field("auth", FieldSchema::bool())
            .field(
                "user",
                FieldSchema::string()
                    .visible(Visibility::FieldTruthy(path("auth")))
                    .constraint(Constraint::required("user is required")),
            )
            .field("secret", FieldSchema::string().hidden()),
    ))
    .unwrap()
}

#[test]
fn hidden_fields_are_not_rendered() {
    let form = user_form();
    let store = ValueStore::new(json!({ "auth": false, "secret": "s3cr3t" }));
    assert_eq!(RenderNode::keys(&render(&form, &store, &[])), vec!["auth"]);
}

#[test]
fn constraint_errors_attach_to_visible_fields_only() {
    let form = user_form();
    let store = ValueStore::new(json!({ "auth": true }));
    let nodes = render(&form, &store, &[]);
    assert_eq!(RenderNode::find(&nodes, "user").unwrap().errors, vec!["user is required"]);
    assert_eq!(
        formwright_form::collect_errors(&nodes),
        vec![ValidationError::new(path("user"), "user is required")]
    );

    let store = ValueStore::new(json!({ "auth": false }));
    assert!(formwright_form::collect_errors(&render(&form, &store, &[])).is_empty());
}

#[test]
fn hook_errors_show_on_their_field() {
    let form = user_form();
    let store = ValueStore::new(json!({ "auth": true, "user": "admin" }));
    let hook_errors = vec![ValidationError::new(path("auth"), "directory unreachable")];
    let nodes = render(&form, &store, &hook_errors);
    assert_eq!(RenderNode::find(&nodes, "auth").unwrap().errors, vec!["directory unreachable"]);
    assert!(RenderNode::find(&nodes, "user").unwrap().errors.is_empty());
}

// ── Array elements ───────────────────────────────────────────────

fn targets_form() -> Form {
    let target = SubForm::ordered(
        Schema::new()
            .field("hostname", FieldSchema::string())
            .field("port", FieldSchema::number())
            .field("weight", FieldSchema::number().visible(Visibility::element(
                FieldPath::root(),
                |root, idx| Ok(idx < root["targets"].as_array().map_or(0, Vec::len) - 1),
            ))),
    );
    Form::attach(SubForm::ordered(Schema::new().field("targets", FieldSchema::array_of(target)))).unwrap()
}

#[test]
fn elements_carry_store_identity_and_index() {
    let form = targets_form();
    let store = ValueStore::new(json!({ "targets": [
        { "hostname": "a", "port": 80 },
        { "hostname": "b", "port": 81 }
    ]}));
    let nodes = render(&form, &store, &[]);
    let Children::Elements(elements) = &nodes[0].children else {
        panic!("targets renders elements");
    };
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[1].index, 1);
    assert_eq!(elements[0].id, store.element_id(&path("targets"), 0).unwrap());
    assert_eq!(elements[1].fields[0].path, path("targets[1].hostname"));
    assert_eq!(elements[1].fields[0].value, json!("b"));
}

#[test]
fn element_predicates_see_their_index() {
    let form = targets_form();
    let store = ValueStore::new(json!({ "targets": [{ "hostname": "a" }, { "hostname": "b" }] }));
    let nodes = render(&form, &store, &[]);
    let Children::Elements(elements) = &nodes[0].children else {
        panic!("targets renders elements");
    };
    assert_eq!(RenderNode::keys(&elements[0].fields), vec!["hostname", "port", "weight"]);
    assert_eq!(RenderNode::keys(&elements[1].fields), vec!["hostname", "port"]);
}

#[test]
fn render_tree_serializes() {
    let form = user_form();
    let store = ValueStore::new(json!({ "auth": false }));
    let json = serde_json::to_value(render(&form, &store, &[])).unwrap();
    assert_eq!(json[0]["key"], json!("auth"));
    assert_eq!(json[0]["path"], json!("auth"));
    assert_eq!(json[0]["kind"], json!("bool"));
    assert_eq!(json[0]["children"], json!("none"));
}

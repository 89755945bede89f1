use formwright_model::{Flow, FieldKind, FieldSchema, Schema, SchemaError, SubForm};
use pretty_assertions::assert_eq;
use serde_json::json;

fn mtls_form() -> SubForm {
    SubForm::ordered(
        Schema::new()
            .field("mtls", FieldSchema::bool().default_value(false))
            .field("loose", FieldSchema::bool().default_value(false))
            .field("certs", FieldSchema::string().list().default_value(json!([]))),
    )
}

// ── Schema ordering ──────────────────────────────────────────────

#[test]
fn fields_keep_declaration_order() {
    let schema = Schema::new()
        .field("url", FieldSchema::string())
        .field("headers", FieldSchema::dictionary())
        .field("timeout", FieldSchema::number());
    assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["url", "headers", "timeout"]);
}

#[test]
fn insert_replaces_in_place() {
    let mut schema = Schema::new()
        .field("a", FieldSchema::string())
        .field("b", FieldSchema::string());
    let old = schema.insert("a", FieldSchema::number());
    assert!(old.is_some());
    assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(schema.get("a").unwrap().kind, FieldKind::Number);
}

#[test]
fn insert_first_moves_key_to_front() {
    let mut schema = Schema::new()
        .field("a", FieldSchema::string())
        .field("b", FieldSchema::string());
    schema.insert_first("b", FieldSchema::bool());
    assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(schema.len(), 2);
}

#[test]
fn from_fields_rejects_duplicates() {
    let err = Schema::from_fields(vec![
        ("a".to_string(), FieldSchema::string()),
        ("a".to_string(), FieldSchema::bool()),
    ])
    .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateField { key, .. } if key == "a"));
}

#[test]
fn remove_field() {
    let mut schema = Schema::new().field("a", FieldSchema::string());
    assert!(schema.remove("a").is_some());
    assert!(schema.remove("a").is_none());
    assert!(schema.is_empty());
}

#[test]
fn remove_keeps_order_of_remaining_fields() {
    let mut schema = Schema::new()
        .field("a", FieldSchema::string())
        .field("b", FieldSchema::string())
        .field("c", FieldSchema::string());
    schema.remove("a");
    assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["b", "c"]);
}

// ── Attach-time validation ───────────────────────────────────────

#[test]
fn object_without_nested_form_is_rejected() {
    let form = SubForm::ordered(Schema::new().field("config", FieldSchema::new(FieldKind::Object)));
    assert_eq!(
        form.validate().unwrap_err(),
        SchemaError::MissingNestedSchema {
            field: "config".into(),
            kind: "object".into()
        }
    );
}

#[test]
fn nested_errors_carry_qualified_names() {
    let inner = SubForm::ordered(Schema::new().field("targets", FieldSchema::new(FieldKind::Array)));
    let form = SubForm::ordered(Schema::new().field("backend", FieldSchema::object(inner)));
    assert!(matches!(
        form.validate().unwrap_err(),
        SchemaError::MissingNestedSchema { field, .. } if field == "backend.targets"
    ));
}

#[test]
fn unknown_static_flow_key_is_rejected() {
    let form = SubForm::new(
        Schema::new().field("url", FieldSchema::string()),
        Flow::keys(["url", "nope"]),
    );
    assert_eq!(
        form.validate().unwrap_err(),
        SchemaError::UnknownFlowKey {
            form: "<root>".into(),
            key: "nope".into()
        }
    );
}

#[test]
fn duplicate_static_flow_key_is_rejected() {
    let form = SubForm::new(
        Schema::new().field("url", FieldSchema::string()),
        Flow::keys(["url", "url"]),
    );
    assert!(matches!(form.validate(), Err(SchemaError::DuplicateFlowKey { .. })));
}

#[test]
fn dynamic_flows_are_not_checked_at_attach() {
    let form = SubForm::new(
        Schema::new().field("url", FieldSchema::string()),
        Flow::dynamic(|_, _| vec!["whatever".to_string()]),
    );
    assert!(form.validate().is_ok());
}

#[test]
fn keys_with_indices_are_rejected() {
    let form = SubForm::ordered(Schema::new().field("targets[0]", FieldSchema::string()));
    assert!(matches!(form.validate(), Err(SchemaError::InvalidPath { .. })));

    let form = SubForm::ordered(Schema::new().field("a..b", FieldSchema::string()));
    assert!(matches!(form.validate(), Err(SchemaError::InvalidPath { .. })));
}

#[test]
fn dotted_keys_are_valid() {
    let form = SubForm::ordered(
        Schema::new()
            .field("mtlsConfig.mtls", FieldSchema::bool())
            .field("mtlsConfig.loose", FieldSchema::bool()),
    );
    assert!(form.validate().is_ok());
}

#[test]
fn dictionary_needs_no_nested_form() {
    let form = SubForm::ordered(Schema::new().field("headers", FieldSchema::dictionary()));
    assert!(form.validate().is_ok());
}

// ── Default templates ────────────────────────────────────────────

#[test]
fn default_value_expands_dotted_keys() {
    let schema = Schema::new()
        .field("url", FieldSchema::string())
        .field("headers", FieldSchema::dictionary().default_value(json!({})))
        .field("mtlsConfig.mtls", FieldSchema::bool().default_value(false))
        .field("mtlsConfig.trustAll", FieldSchema::bool().default_value(false));
    assert_eq!(
        schema.default_value(),
        json!({ "headers": {}, "mtlsConfig": { "mtls": false, "trustAll": false } })
    );
}

#[test]
fn default_value_recurses_into_objects() {
    let schema = Schema::new()
        .field("clusterUri", FieldSchema::string())
        .field("mtlsConfig", FieldSchema::object(mtls_form()));
    assert_eq!(
        schema.default_value(),
        json!({ "mtlsConfig": { "mtls": false, "loose": false, "certs": [] } })
    );
}

#[test]
fn computed_default_sees_earlier_fields() {
    let schema = Schema::new()
        .field("hostname", FieldSchema::string().default_value("localhost"))
        .field(
            "summary",
            FieldSchema::string().computed_default(|partial| {
                json!(format!("http://{}", partial["hostname"].as_str().unwrap_or("")))
            }),
        );
    assert_eq!(
        schema.default_value(),
        json!({ "hostname": "localhost", "summary": "http://localhost" })
    );
}

#[test]
fn array_fields_get_no_implicit_default() {
    let targets = SubForm::ordered(Schema::new().field("hostname", FieldSchema::string().default_value("x")));
    let schema = Schema::new().field("targets", FieldSchema::array_of(targets));
    assert_eq!(schema.default_value(), json!({}));
}

// ── FieldSchema builder ──────────────────────────────────────────

#[test]
fn builder_sets_metadata() {
    let field = FieldSchema::string()
        .label("Host")
        .help("The target host")
        .placeholder("example.com")
        .render_with("target-summary")
        .disabled()
        .synthetic();
    assert_eq!(field.label.as_deref(), Some("Host"));
    assert_eq!(field.help.as_deref(), Some("The target host"));
    assert_eq!(field.placeholder.as_deref(), Some("example.com"));
    assert_eq!(field.render_override.as_deref(), Some("target-summary"));
    assert!(field.disabled);
    assert!(field.synthetic);
    assert!(field.visibility.is_always());
}

#[test]
fn element_list_detection() {
    assert!(FieldSchema::array_of(mtls_form()).is_element_list());
    assert!(!FieldSchema::string().list().is_element_list());
    assert!(!FieldSchema::object(mtls_form()).is_element_list());
}

#[test]
fn field_kind_serializes_snake_case() {
    assert_eq!(serde_json::to_value(FieldKind::Bool).unwrap(), json!("bool"));
    assert_eq!(
        serde_json::to_value(FieldKind::Code { mode: "json".into() }).unwrap(),
        json!({ "code": { "mode": "json" } })
    );
}

use async_trait::async_trait;
use formwright_form::{Children, Form, FormSession, InMemoryPersistence, RenderNode, SessionConfig};
use formwright_sdl::{
    directive_flow, parse, Directive, FieldDefinition, LocalSdlService, SchemaEditor, SdlError, SdlResult,
    SdlService, Selection, TypeModel, TypeRef,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const SCHEMA: &str = r#"
type Country {
  name: String
}

type Query {
  countries: [Country] @rest(url: "https://restcountries.com/v3/all")
}
"#;

fn editor() -> SchemaEditor {
    SchemaEditor::new(parse(SCHEMA).unwrap())
}

/// Always fails to print, to exercise error reporting on save.
struct BrokenService;

#[async_trait]
impl SdlService for BrokenService {
    async fn to_model(&self, _sdl: &str) -> SdlResult<TypeModel> {
        Err(SdlError::Service("conversion backend unreachable".into()))
    }

    async fn to_sdl(&self, _model: &TypeModel) -> SdlResult<String> {
        Err(SdlError::Service("conversion backend unreachable".into()))
    }
}

fn arguments_keys(nodes: &[RenderNode], element: usize) -> Vec<String> {
    let Children::Elements(elements) = &RenderNode::find(nodes, "directives").unwrap().children else {
        panic!("directives should render as elements");
    };
    match &RenderNode::find(&elements[element].fields, "arguments").unwrap().children {
        Children::Fields(fields) => fields.iter().map(|f| f.key.clone()).collect(),
        other => panic!("expected nested fields, got {other:?}"),
    }
}

// ── Types and fields ─────────────────────────────────────────────

#[test]
fn new_type_gets_a_foo_field_and_is_selected() {
    let mut editor = editor();
    let index = editor.create_type("Currency").unwrap();
    assert_eq!(index, 2);
    assert_eq!(
        editor.model().types[2].fields,
        vec![FieldDefinition::new("foo", TypeRef::named("String"))]
    );
    assert_eq!(
        editor.selected(),
        Some(Selection {
            type_index: 2,
            field_index: 0
        })
    );
}

#[test]
fn type_names_are_checked() {
    let mut editor = editor();
    assert_eq!(editor.create_type("Query"), Err(SdlError::DuplicateType("Query".into())));
    assert_eq!(editor.create_type("2fast"), Err(SdlError::InvalidName("2fast".into())));
    assert_eq!(editor.model().types.len(), 2);
}

#[test]
fn new_field_is_a_plain_string_and_selected() {
    let mut editor = editor();
    let index = editor.create_field(0, "capital").unwrap();
    let field = &editor.model().types[0].fields[index];
    assert_eq!(field.field_type, TypeRef::named("String"));
    assert!(!field.field_type.is_list);
    assert_eq!(
        editor.selected(),
        Some(Selection {
            type_index: 0,
            field_index: 1
        })
    );
    assert_eq!(editor.create_field(7, "x"), Err(SdlError::NoSuchType(7)));
}

#[test]
fn removing_shifts_or_clears_the_selection() {
    let mut editor = editor();
    editor.create_field(1, "country").unwrap();
    editor.remove_type(0).unwrap();
    assert_eq!(
        editor.selected(),
        Some(Selection {
            type_index: 0,
            field_index: 1
        })
    );

    editor.remove_field(0, 0).unwrap();
    assert_eq!(
        editor.selected(),
        Some(Selection {
            type_index: 0,
            field_index: 0
        })
    );
    editor.remove_field(0, 0).unwrap();
    assert_eq!(editor.selected(), None);
    assert_eq!(
        editor.remove_field(0, 0),
        Err(SdlError::NoSuchField {
            type_index: 0,
            field_index: 0
        })
    );
}

#[test]
fn type_options_skip_query_and_the_current_type() {
    let mut editor = editor();
    editor.create_type("Currency").unwrap();
    assert_eq!(editor.type_options(), vec!["Int", "String", "Boolean", "Float", "Country"]);

    editor.select_field(0, 0).unwrap();
    assert_eq!(editor.type_options(), vec!["Int", "String", "Boolean", "Float", "Currency"]);
    assert_eq!(editor.select_field(0, 5), Err(SdlError::NoSuchField { type_index: 0, field_index: 5 }));
}

// ── Field form ───────────────────────────────────────────────────

#[test]
fn directive_arguments_follow_the_directive_name() {
    assert_eq!(directive_flow("json"), ["path"]);
    assert_eq!(directive_flow("onePermissionsOf"), directive_flow("allpermissions"));
    assert!(directive_flow("cache").is_empty());

    let mut editor = editor();
    editor.select_field(1, 0).unwrap();
    let form = Form::attach(editor.field_form()).unwrap();
    let session = FormSession::with_value(
        form,
        "Query.countries",
        editor.field_value().unwrap(),
        Arc::new(InMemoryPersistence::new()),
        SessionConfig::default(),
    );

    assert_eq!(
        RenderNode::keys(&session.fields()),
        vec!["name", "fieldType", "arguments", "directives"]
    );
    assert_eq!(
        arguments_keys(&session.fields(), 0),
        vec!["url", "method", "headers", "timeout", "paginate"]
    );

    session.write("directives[0].name", json!("json")).unwrap();
    assert_eq!(arguments_keys(&session.fields(), 0), vec!["path"]);

    session.write("directives[0].name", json!("cache")).unwrap();
    assert!(arguments_keys(&session.fields(), 0).is_empty());
}

#[test]
fn edited_field_is_written_back() {
    let mut editor = editor();
    editor.select_field(1, 0).unwrap();
    let session = FormSession::with_value(
        Form::attach(editor.field_form()).unwrap(),
        "Query.countries",
        editor.field_value().unwrap(),
        Arc::new(InMemoryPersistence::new()),
        SessionConfig::default(),
    );
    session.write("fieldType.required", json!(true)).unwrap();
    session.write("directives[0].arguments.timeout", json!(2000)).unwrap();

    editor.update_field(session.value().as_ref().clone()).unwrap();
    let field = &editor.model().types[1].fields[0];
    assert_eq!(field.field_type, TypeRef::named("Country").list().required());
    assert_eq!(
        field.directives,
        vec![Directive::new("rest")
            .arg("url", "https://restcountries.com/v3/all")
            .arg("timeout", 2000)]
    );

    assert!(matches!(
        editor.update_field(json!({ "name": 3 })),
        Err(SdlError::InvalidField(_))
    ));
    assert_eq!(editor.update_field(json!({ "name": "has space" })), Err(SdlError::InvalidName("has space".into())));
}

// ── Service round trips ──────────────────────────────────────────

#[tokio::test]
async fn load_and_save_through_the_service() {
    let mut editor = SchemaEditor::default();
    editor.load(&LocalSdlService, SCHEMA).await.unwrap();
    assert_eq!(editor.model().types.len(), 2);

    editor.create_type("Currency").unwrap();
    let sdl = editor.save(&LocalSdlService).await.unwrap();
    assert!(sdl.contains("type Currency {\n  foo: String\n}"), "{sdl}");
    assert_eq!(editor.error(), None);
}

#[tokio::test]
async fn failed_load_keeps_the_model() {
    let mut editor = editor();
    let before = editor.model().clone();

    let err = editor.load(&LocalSdlService, "type Query {").await.unwrap_err();
    assert!(matches!(err, SdlError::Syntax { .. }));
    assert_eq!(editor.model(), &before);
    assert_eq!(editor.error(), Some(err.user_message().as_str()));

    editor.reload(&LocalSdlService, SCHEMA).await.unwrap();
    assert_eq!(editor.error(), None);
}

#[tokio::test]
async fn reload_keeps_a_selection_that_still_exists() {
    let mut editor = editor();
    editor.select_field(1, 0).unwrap();
    editor.reload(&LocalSdlService, SCHEMA).await.unwrap();
    assert_eq!(
        editor.selected(),
        Some(Selection {
            type_index: 1,
            field_index: 0
        })
    );

    editor.reload(&LocalSdlService, "type Query { a: Int }").await.unwrap();
    assert_eq!(editor.selected(), None);
}

#[tokio::test]
async fn failed_save_reports_but_keeps_editing_state() {
    let mut editor = editor();
    editor.create_type("Currency").unwrap();
    let err = editor.save(&BrokenService).await.unwrap_err();
    assert_eq!(err, SdlError::Service("conversion backend unreachable".into()));
    assert_eq!(editor.error(), Some("SDL service error: conversion backend unreachable"));
    assert_eq!(editor.model().types.len(), 3);
}

use formwright_form::flow::resolve;
use formwright_model::{FieldSchema, Flow, FlowContext, Schema, SubForm};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn strings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

fn mailer_schema() -> Schema {
    Schema::new()
        .field("type", FieldSchema::string())
        .field("url", FieldSchema::string())
        .field("headers", FieldSchema::dictionary())
        .field("eu", FieldSchema::bool())
        .field("apiKey", FieldSchema::string())
        .field("domain", FieldSchema::string())
}

// ── Static flows ─────────────────────────────────────────────────

#[test]
fn static_flow_is_returned_unchanged() {
    let form = SubForm::new(mailer_schema(), Flow::keys(["domain", "type", "eu"]));
    let value = json!({ "type": "mailgun" });
    assert_eq!(
        resolve(&form, &value, &FlowContext::root(&value)),
        strings(&["domain", "type", "eu"])
    );
}

// ── Dynamic flows ────────────────────────────────────────────────

fn mailer_form() -> SubForm {
    SubForm::new(
        mailer_schema(),
        Flow::dynamic(|value, _| {
            let tail: &[&str] = match value["type"].as_str() {
                Some("generic") => &["url", "headers"],
                Some("mailgun") => &["eu", "apiKey", "domain"],
                _ => &[],
            };
            std::iter::once("type").chain(tail.iter().copied()).map(String::from).collect()
        }),
    )
}

#[test]
fn dynamic_flow_follows_the_value() {
    let form = mailer_form();
    let generic = json!({ "type": "generic" });
    let mailgun = json!({ "type": "mailgun" });
    assert_eq!(
        resolve(&form, &generic, &FlowContext::root(&generic)),
        strings(&["type", "url", "headers"])
    );
    assert_eq!(
        resolve(&form, &mailgun, &FlowContext::root(&mailgun)),
        strings(&["type", "eu", "apiKey", "domain"])
    );
}

#[test]
fn dynamic_flow_may_be_empty() {
    let form = SubForm::new(mailer_schema(), Flow::dynamic(|_, _| Vec::new()));
    let value = json!({});
    assert!(resolve(&form, &value, &FlowContext::root(&value)).is_empty());
}

#[test]
fn dynamic_flow_sees_root_and_element_index() {
    let form = SubForm::new(
        mailer_schema(),
        Flow::dynamic(|_, ctx| {
            let wanted = ctx.root_value["kind"].as_str().unwrap_or("type");
            match ctx.element_index {
                Some(0) => vec![wanted.to_string()],
                _ => vec!["type".to_string()],
            }
        }),
    );
    let root = json!({ "kind": "domain" });
    let element = json!({});
    let ctx = FlowContext {
        root_value: &root,
        parent_value: Some(&root),
        element_index: Some(0),
    };
    assert_eq!(resolve(&form, &element, &ctx), strings(&["domain"]));
}

#[test]
fn undeclared_and_repeated_dynamic_keys_are_dropped() {
    let form = SubForm::new(
        mailer_schema(),
        Flow::dynamic(|_, _| strings(&["url", "ghost", "url", "eu"])),
    );
    let value = json!({});
    assert_eq!(resolve(&form, &value, &FlowContext::root(&value)), strings(&["url", "eu"]));
}

#[test]
fn panicking_dynamic_flow_falls_back_to_declaration_order() {
    let form = SubForm::new(
        Schema::new()
            .field("b", FieldSchema::string())
            .field("a", FieldSchema::string()),
        Flow::dynamic(|_, _| panic!("broken flow")),
    );
    let value = json!({});
    assert_eq!(resolve(&form, &value, &FlowContext::root(&value)), strings(&["b", "a"]));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    /// For any static flow over declared keys, resolution returns exactly
    /// that flow, whatever the value holds.
    #[test]
    fn static_resolution_is_exact(
        keys in prop::collection::hash_set("[a-z]{1,8}", 1..12),
        shuffle_seed in any::<u64>(),
        noise in "[a-z]{0,6}",
    ) {
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort();
        let rotate = (shuffle_seed as usize) % keys.len();
        keys.rotate_left(rotate);

        let schema = keys
            .iter()
            .fold(Schema::new(), |schema, key| schema.field(key.clone(), FieldSchema::string()));
        let form = SubForm::new(schema, Flow::Static(keys.clone()));
        prop_assert!(form.validate().is_ok());

        let value = json!({ "noise": noise });
        prop_assert_eq!(resolve(&form, &value, &FlowContext::root(&value)), keys);
    }
}

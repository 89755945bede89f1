use formwright_form::{FormSession, InMemoryPersistence, RenderNode, SessionConfig, SessionState};
use formwright_plugins::builtins::GRAPHQL_BACKEND;
use formwright_plugins::{
    global, prepare_plugin_form, resolve_legacy, visible_plugins, CatalogPolicy, LegacyResolution, PluginError,
    StaticCatalog, UiContext,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

const CATALOG: &str = r#"[
  {
    "id": "cp:otoroshi.next.plugins.GraphQLBackend",
    "name": "GraphQL composer",
    "plugin_type": "ng",
    "plugin_visibility": "userland",
    "default_config": { "schema": "type Query { hello: String }", "maxDepth": 15 },
    "config_schema": {
      "schema": { "type": "code", "format": "graphql", "label": "Schema" },
      "maxDepth": { "type": "number", "label": "Max depth" }
    },
    "config_flow": ["schema", "maxDepth"]
  },
  {
    "id": "cp:otoroshi.next.proxy.ProxyEngine",
    "plugin_visibility": "userland"
  },
  {
    "pluginId": "cp:otoroshi.next.plugins.Internal",
    "plugin_visibility": "internal"
  },
  {
    "id": "cp:otoroshi.next.plugins.OverrideHost",
    "plugin_visibility": "userland"
  }
]"#;

fn catalog() -> StaticCatalog {
    StaticCatalog::from_json(CATALOG).unwrap()
}

// ── Policy ───────────────────────────────────────────────────────

#[tokio::test]
async fn internal_and_excluded_plugins_are_not_offered() {
    let visible = visible_plugins(&catalog(), &CatalogPolicy::default()).await.unwrap();
    let ids: Vec<&str> = visible.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["cp:otoroshi.next.plugins.GraphQLBackend", "cp:otoroshi.next.plugins.OverrideHost"]
    );
}

#[test]
fn policy_parses_from_toml() {
    let policy = CatalogPolicy::from_toml(
        r#"
[catalog]
excluded-ids = ["otoroshi.next.plugins.OverrideHost"]

[catalog.legacy-overrides]
job = "otoroshi.next.plugins.wrappers.JobWrapper"
"#,
    )
    .unwrap();
    assert_eq!(policy.excluded_visibilities, vec!["internal"]);
    assert_eq!(policy.excluded_ids, vec!["otoroshi.next.plugins.OverrideHost"]);
    assert_eq!(
        policy.legacy_overrides.get("job").map(String::as_str),
        Some("otoroshi.next.plugins.wrappers.JobWrapper")
    );
}

#[test]
fn policy_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(CatalogPolicy::load_from(dir.path().join("missing.toml")), CatalogPolicy::default());

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[catalog\nexcluded-ids = 3").unwrap();
    assert_eq!(CatalogPolicy::load_from(&broken), CatalogPolicy::default());
}

#[test]
fn policy_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[catalog]\nexcluded-visibilities = []").unwrap();
    let policy = CatalogPolicy::load_from(file.path());
    assert!(policy.excluded_visibilities.is_empty());
    assert_eq!(policy.excluded_ids, CatalogPolicy::default().excluded_ids);
}

// ── Legacy wrappers ──────────────────────────────────────────────

#[test]
fn legacy_kinds_resolve_to_wrappers() {
    let policy = CatalogPolicy::default();
    assert_eq!(
        resolve_legacy(&policy, "validator", "cp:otoroshi.plugins.apikeys.ClientCredentialFlow"),
        LegacyResolution::Wrapped {
            wrapper: "otoroshi.next.plugins.wrappers.AccessValidatorWrapper".to_string(),
            legacy_id: "cp:otoroshi.plugins.apikeys.ClientCredentialFlow".to_string(),
        }
    );
    assert_eq!(
        resolve_legacy(&policy, "app", "cp:a"),
        resolve_legacy(&policy, "transformer", "cp:a")
    );
}

#[test]
fn empty_and_unknown_kinds_are_verbatim() {
    let policy = CatalogPolicy::default();
    for kind in ["listener", "job", "exporter", "request-handler", "never-heard-of"] {
        assert_eq!(
            resolve_legacy(&policy, kind, "cp:x"),
            LegacyResolution::Verbatim { id: "cp:x".to_string() }
        );
    }
}

#[test]
fn overrides_take_precedence() {
    let mut policy = CatalogPolicy::default();
    policy.legacy_overrides.insert("job".into(), "JobWrapper".into());
    policy.legacy_overrides.insert("sink".into(), String::new());
    assert!(matches!(resolve_legacy(&policy, "job", "cp:j"), LegacyResolution::Wrapped { .. }));
    assert!(matches!(resolve_legacy(&policy, "sink", "cp:s"), LegacyResolution::Verbatim { .. }));
}

// ── Prepared forms ───────────────────────────────────────────────

#[tokio::test]
async fn prepared_plugin_nests_the_specialized_config() {
    let prepared = prepare_plugin_form(
        &catalog(),
        global(),
        &CatalogPolicy::default(),
        GRAPHQL_BACKEND,
        &UiContext::default(),
    )
    .await
    .unwrap();

    assert_eq!(prepared.descriptor.name.as_deref(), Some("GraphQL composer"));
    assert_eq!(
        prepared.default_value,
        json!({
            "enabled": true,
            "debug": false,
            "include": [],
            "exclude": [],
            "config": { "schema": "type Query { hello: String }", "maxDepth": 15, "turn_view": false }
        })
    );

    let session = FormSession::with_value(
        prepared.form,
        "route-plugin",
        prepared.default_value,
        Arc::new(InMemoryPersistence::new()),
        SessionConfig::default(),
    );
    let fields = session.fields();
    assert_eq!(RenderNode::keys(&fields), vec!["enabled", "debug", "include", "exclude", "config"]);
    assert_eq!(session.persisted_value()["config"].get("turn_view"), None);
    assert_eq!(session.state(), SessionState::Clean);
}

#[tokio::test]
async fn excluded_and_unknown_plugins_are_rejected() {
    let policy = CatalogPolicy::default();
    let excluded = prepare_plugin_form(
        &catalog(),
        global(),
        &policy,
        "cp:otoroshi.next.plugins.Internal",
        &UiContext::default(),
    )
    .await;
    assert!(matches!(excluded, Err(PluginError::Excluded { .. })));

    let missing = prepare_plugin_form(&catalog(), global(), &policy, "cp:nope", &UiContext::default()).await;
    assert!(matches!(missing, Err(PluginError::NotFound(id)) if id == "cp:nope"));
}

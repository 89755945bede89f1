//! Commands behind the `formwright` binary, kept here so they can be tested
//! without spawning a process.

use anyhow::{Context, Result};
use formwright_form::{FormSession, InMemoryPersistence, RenderNode, SessionConfig};
use formwright_model::{PluginDescriptor, ValidationError};
use formwright_plugins::{global, prepare_plugin_form, CatalogPolicy, StaticCatalog, UiContext};
use formwright_sdl::TypeModel;
use formwright_types::FieldPath;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// What `formwright inspect` prints.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub plugin: String,
    /// The value that would be persisted, synthetic fields removed.
    pub value: Value,
    pub fields: Vec<RenderNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

/// Resolves the form of the plugin described by `descriptor` against `value`
/// (or the plugin's defaults).
pub async fn inspect(
    descriptor: &str,
    value: Option<Value>,
    policy: &CatalogPolicy,
    designer: bool,
) -> Result<InspectReport> {
    let descriptor: PluginDescriptor = serde_json::from_str(descriptor).context("invalid plugin descriptor")?;
    let plugin = descriptor.id.clone();
    let catalog = StaticCatalog::new(vec![descriptor]);
    let context = UiContext {
        parent_node: FieldPath::root(),
        allow_designer: designer,
    };

    let prepared = prepare_plugin_form(&catalog, global(), policy, &plugin, &context)
        .await
        .with_context(|| format!("cannot build the form of {plugin}"))?;
    let value = value.unwrap_or(prepared.default_value);

    let session = FormSession::with_value(
        prepared.form,
        plugin.clone(),
        value,
        Arc::new(InMemoryPersistence::new()),
        SessionConfig::default(),
    );
    debug!(plugin = %plugin, "form resolved");
    Ok(InspectReport {
        plugin,
        value: session.persisted_value(),
        fields: session.fields(),
        errors: session.validate(),
    })
}

/// `formwright sdl parse`: SDL in, pretty TypeModel JSON out.
pub fn sdl_to_json(sdl: &str) -> Result<String> {
    let model = formwright_sdl::parse(sdl)?;
    Ok(serde_json::to_string_pretty(&model)?)
}

/// `formwright sdl print`: TypeModel JSON in, SDL out.
pub fn json_to_sdl(json: &str) -> Result<String> {
    let model: TypeModel = serde_json::from_str(json).context("invalid type model")?;
    Ok(formwright_sdl::serialize(&model)?)
}

//! Plugin catalog and the forms built from it.

use crate::error::{PluginError, PluginResult};
use crate::policy::CatalogPolicy;
use crate::registry::{TransformRegistry, UiContext};
use async_trait::async_trait;
use formwright_form::Form;
use formwright_model::{FieldSchema, PluginDescriptor, Schema, SubForm};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Describes the plugins a backend offers.
#[async_trait]
pub trait PluginCatalog: Send + Sync {
    async fn list(&self) -> PluginResult<Vec<PluginDescriptor>>;

    async fn describe(&self, plugin_id: &str) -> PluginResult<PluginDescriptor>;
}

/// A catalog held in memory, typically decoded from a backend's JSON listing.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    plugins: Vec<PluginDescriptor>,
}

impl StaticCatalog {
    pub fn new(plugins: Vec<PluginDescriptor>) -> Self {
        Self { plugins }
    }

    /// Decodes a JSON array of plugin descriptors, or a single descriptor.
    pub fn from_json(json: &str) -> PluginResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let plugins = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            other => vec![serde_json::from_value(other)?],
        };
        Ok(Self { plugins })
    }
}

#[async_trait]
impl PluginCatalog for StaticCatalog {
    async fn list(&self) -> PluginResult<Vec<PluginDescriptor>> {
        Ok(self.plugins.clone())
    }

    async fn describe(&self, plugin_id: &str) -> PluginResult<PluginDescriptor> {
        self.plugins
            .iter()
            .find(|p| p.id == plugin_id)
            .cloned()
            .ok_or_else(|| PluginError::NotFound(plugin_id.to_string()))
    }
}

/// The catalog entries the policy lets the editor offer.
pub async fn visible_plugins(catalog: &dyn PluginCatalog, policy: &CatalogPolicy) -> PluginResult<Vec<PluginDescriptor>> {
    let all = catalog.list().await?;
    let total = all.len();
    let visible: Vec<_> = all.into_iter().filter(|p| !policy.is_excluded(p)).collect();
    debug!(total, visible = visible.len(), "catalog filtered");
    Ok(visible)
}

/// The per-instance settings every plugin on a route carries.
pub fn plugin_information_form() -> SubForm {
    SubForm::ordered(
        Schema::new()
            .field("enabled", FieldSchema::bool().label("Enabled").default_value(true))
            .field("debug", FieldSchema::bool().label("Debug").default_value(false))
            .field(
                "include",
                FieldSchema::code("single-line").list().label("Include").default_value(json!([])),
            )
            .field(
                "exclude",
                FieldSchema::code("single-line").list().label("Exclude").default_value(json!([])),
            ),
    )
}

/// A plugin ready to be edited on a route.
#[derive(Debug, Clone)]
pub struct PreparedPlugin {
    pub descriptor: PluginDescriptor,
    /// Instance settings plus the specialized `config` sub-form.
    pub form: Form,
    /// Starting value for a newly added instance.
    pub default_value: Value,
}

/// Builds the editing form for `plugin_id`: describe it, check the policy,
/// derive the generic form, apply the registered transform, then nest it
/// under the instance settings.
pub async fn prepare_plugin_form(
    catalog: &dyn PluginCatalog,
    registry: &TransformRegistry,
    policy: &CatalogPolicy,
    plugin_id: &str,
    context: &UiContext,
) -> PluginResult<PreparedPlugin> {
    let descriptor = catalog.describe(plugin_id).await?;
    if let Some(reason) = policy.exclusion(&descriptor) {
        return Err(PluginError::Excluded {
            id: descriptor.id,
            reason,
        });
    }

    let config = registry.resolve(&descriptor.id, descriptor.to_form()?, context)?;
    let instance = plugin_information_form().schema.field("config", FieldSchema::object(config));
    let form = Form::attach(SubForm::ordered(instance))?;

    let mut default_value = form.default_value();
    if let Value::Object(map) = &mut default_value {
        let mut config = descriptor.default_config()?;
        if let Some(config_form) = form.root().schema.get("config").and_then(FieldSchema::sub_form) {
            fill_defaults(config_form, &mut config);
        }
        map.insert("config".to_string(), config);
    }

    info!(plugin = %descriptor.id, "plugin form prepared");
    Ok(PreparedPlugin {
        descriptor,
        form,
        default_value,
    })
}

/// Adds defaults the transform introduced to a configuration that lacks them.
fn fill_defaults(form: &SubForm, config: &mut Value) {
    let (Value::Object(defaults), Value::Object(target)) = (form.default_value(), config) else {
        return;
    };
    for (key, value) in defaults {
        target.entry(key).or_insert(value);
    }
}

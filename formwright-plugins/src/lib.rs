//! Plugin forms for Formwright.
//!
//! A backend describes each plugin with a [`PluginDescriptor`]; the generic
//! form derived from it is then specialized by a transform looked up in a
//! [`TransformRegistry`] by exact plugin id. The process-wide registry
//! ([`global`]) holds the builtin specializations.
//!
//! [`CatalogPolicy`] decides which plugins are offered and how legacy plugin
//! kinds map to wrapper plugins.
//!
//! [`PluginDescriptor`]: formwright_model::PluginDescriptor

pub mod builtins;
mod catalog;
mod error;
mod legacy;
mod policy;
mod registry;

pub use catalog::{
    plugin_information_form, prepare_plugin_form, visible_plugins, PluginCatalog, PreparedPlugin, StaticCatalog,
};
pub use error::{PluginError, PluginResult};
pub use legacy::{resolve_legacy, LegacyResolution};
pub use policy::CatalogPolicy;
pub use registry::{global, splice, Transform, TransformRegistry, UiContext};

use crate::policy::CatalogPolicy;
use serde::Serialize;

/// Legacy plugin kind → wrapper plugin id. An empty id means the plugin is
/// used as is.
const WRAPPERS: &[(&str, &str)] = &[
    ("app", "otoroshi.next.plugins.wrappers.RequestTransformerWrapper"),
    ("transformer", "otoroshi.next.plugins.wrappers.RequestTransformerWrapper"),
    ("validator", "otoroshi.next.plugins.wrappers.AccessValidatorWrapper"),
    ("preroute", "otoroshi.next.plugins.wrappers.PreRoutingWrapper"),
    ("sink", "otoroshi.next.plugins.wrappers.RequestSinkWrapper"),
    ("composite", "otoroshi.next.plugins.wrappers.CompositeWrapper"),
    ("listener", ""),
    ("job", ""),
    ("exporter", ""),
    ("request-handler", ""),
];

/// How a legacy plugin is referenced from a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegacyResolution {
    /// Use `wrapper` and pass the legacy plugin id in its configuration.
    Wrapped { wrapper: String, legacy_id: String },
    /// Use the plugin id itself.
    Verbatim { id: String },
}

/// Resolves a legacy plugin of kind `label`. Unknown kinds and kinds mapped
/// to an empty wrapper resolve to the id verbatim.
pub fn resolve_legacy(policy: &CatalogPolicy, label: &str, legacy_id: &str) -> LegacyResolution {
    let wrapper = policy
        .legacy_overrides
        .get(label)
        .map(String::as_str)
        .or_else(|| WRAPPERS.iter().find(|(kind, _)| *kind == label).map(|(_, id)| *id))
        .unwrap_or_default();

    if wrapper.is_empty() {
        LegacyResolution::Verbatim {
            id: legacy_id.to_string(),
        }
    } else {
        LegacyResolution::Wrapped {
            wrapper: wrapper.to_string(),
            legacy_id: legacy_id.to_string(),
        }
    }
}

use crate::error::PluginResult;
use crate::registry::UiContext;
use formwright_model::{FieldSchema, Schema, SubForm};

/// The tunnel plugin is configured by its tunnel id alone.
pub(super) fn tunnel(_generated: SubForm, _context: &UiContext) -> PluginResult<SubForm> {
    Ok(SubForm::ordered(
        Schema::new().field("tunnel_id", FieldSchema::string().label("Tunnel ID")),
    ))
}

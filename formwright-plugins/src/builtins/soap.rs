use crate::error::PluginResult;
use crate::registry::UiContext;
use formwright_model::{FieldSchema, SubForm};

pub(super) fn soap_envelope(mut form: SubForm, _context: &UiContext) -> PluginResult<SubForm> {
    form.schema
        .insert("envelope", FieldSchema::code("xml").label("envelope"));
    Ok(form)
}

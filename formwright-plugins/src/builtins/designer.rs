use crate::error::PluginResult;
use crate::registry::{splice, UiContext};
use formwright_model::{FieldSchema, SubForm, Visibility};

/// Presentation-only toggle that opens a dedicated designer view.
fn turn_view(renderer: &str, context: &UiContext) -> FieldSchema {
    let field = FieldSchema::bool()
        .default_value(false)
        .synthetic()
        .render_with(renderer);
    if context.allow_designer {
        field
    } else {
        field.hidden()
    }
}

pub(super) fn graphql_backend(mut form: SubForm, context: &UiContext) -> PluginResult<SubForm> {
    if !form.schema.contains("turn_view") {
        form.schema.insert_first("turn_view", turn_view("graphql-designer", context));
    }
    if !form.schema.contains("permissions") {
        form.schema
            .insert("permissions", FieldSchema::string().list().label("Permissions paths"));
    }
    form.flow = splice(form.flow, &["turn_view"], &["permissions"]);
    Ok(form)
}

pub(super) fn mock_responses(mut form: SubForm, context: &UiContext) -> PluginResult<SubForm> {
    if !form.schema.contains("turn_view") {
        form.schema.insert_first("turn_view", turn_view("mocks-designer", context));
    }
    // Mocks are edited in the designer view only.
    if let Some(form_data) = form.schema.get_mut("form_data") {
        form_data.visibility = Visibility::Never;
    }
    form.flow = splice(form.flow, &["turn_view"], &[]);
    Ok(form)
}

/// Configuration for an editing session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Report constraint failures from every `edit`, not only from `save`.
    pub validate_on_edit: bool,
    /// Maximum number of writes after-change hooks may make during one edit.
    pub max_hook_writes: usize,
    /// Message passed to `Dialogs::confirm` before removing an array element.
    pub confirm_remove_message: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validate_on_edit: true,
            max_hook_writes: 64,
            confirm_remove_message: "Are you sure you want to delete this element ?".to_string(),
        }
    }
}

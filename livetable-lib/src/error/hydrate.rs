//! Hydration error types

/// Errors from binding the hydration engine.
#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    /// The prerendered widget markup is not in the tree: no table with the
    /// given id, or the table is not inside a widget wrapper.
    #[error("Prerendered widget markup not found for '{widget_id}'")]
    MarkupMissing { widget_id: String },
}

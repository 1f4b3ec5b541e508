//! Prerendering error types

/// Errors from the table prerenderer.
#[derive(Debug, thiserror::Error)]
pub enum PrerenderError {
    /// The supplied element is not a table.
    #[error("Expected a table element, found <{tag}>")]
    TableMissing { tag: String },
}

//! Script bundle composition

use crate::error::ServeError;
use crate::request::ScriptRequest;

/// Sources composed into the script response.
///
/// `library_source` is the widget implementation served verbatim;
/// `bootstrap_source` defines the function named by `bootstrap_entry`, which
/// the bundle invokes with the widget id and options.
#[derive(Debug, Clone)]
pub struct ScriptAssets {
    pub library_source: String,
    pub bootstrap_source: String,
    pub bootstrap_entry: String,
}

impl ScriptAssets {
    pub fn new(
        library_source: impl Into<String>,
        bootstrap_source: impl Into<String>,
        bootstrap_entry: impl Into<String>,
    ) -> Self {
        Self {
            library_source: library_source.into(),
            bootstrap_source: bootstrap_source.into(),
            bootstrap_entry: bootstrap_entry.into(),
        }
    }
}

/// Compose the response body for a verified script request.
///
/// The whole bundle runs inside one IIFE so nothing leaks into the page
/// scope; the widget id and options are embedded as JSON literals.
pub(super) fn compose(
    assets: &ScriptAssets,
    request: &ScriptRequest,
) -> Result<String, ServeError> {
    let widget_id = serde_json::Value::String(request.widget_id.clone());
    let options = serde_json::to_string(&request.options)?;
    Ok(format!(
        "(function () {{\n{}\n{}\n{}({}, {});\n}})();\n",
        assets.library_source, assets.bootstrap_source, assets.bootstrap_entry, widget_id, options
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RenderOptions;

    fn assets() -> ScriptAssets {
        ScriptAssets::new(
            "var liveTable = {};",
            "function boot(id, options) {}",
            "boot",
        )
    }

    #[test]
    fn test_bundle_shape() {
        let request = ScriptRequest::new("livetable-7", RenderOptions::default());
        let bundle = compose(&assets(), &request).unwrap();
        assert!(bundle.starts_with("(function () {\nvar liveTable = {};\n"));
        assert!(bundle.contains("\nfunction boot(id, options) {}\n"));
        assert!(bundle.contains("\nboot(\"livetable-7\", {\"sortable\":true"));
        assert!(bundle.ends_with(");\n})();\n"));
    }

    #[test]
    fn test_widget_id_is_json_encoded() {
        let request = ScriptRequest::new("t\"1", RenderOptions::default());
        let bundle = compose(&assets(), &request).unwrap();
        assert!(bundle.contains(r#"boot("t\"1", "#));
    }

    #[test]
    fn test_options_embed_as_object_literal() {
        let mut options = RenderOptions::default();
        options.per_page_select = None;
        let request = ScriptRequest::new("t", options);
        let bundle = compose(&assets(), &request).unwrap();
        assert!(bundle.contains("\"perPageSelect\":false"));
    }
}

//! Signed script requests

use serde::Deserialize;
use serde::Serialize;
use tabledom::{Element, Node};

use crate::error::ServeError;
use crate::model::RenderOptions;
use crate::sign::Secret;

/// Query parameter carrying the canonical JSON payload.
pub const SCRIPT_PARAM: &str = "livetable-script";

/// Query parameter carrying the payload signature.
pub const SIGNATURE_PARAM: &str = "livetable-script-hmac";

/// A request for the composed widget script of one table.
///
/// The canonical payload is this struct's JSON serialization, produced once
/// when the URL is rendered and carried verbatim; signing and verification
/// both operate on that exact string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub options: RenderOptions,
    pub widget_id: String,
}

impl ScriptRequest {
    pub fn new(widget_id: impl Into<String>, options: RenderOptions) -> Self {
        Self {
            options,
            widget_id: widget_id.into(),
        }
    }

    /// The canonical JSON payload this request signs.
    pub fn canonical_payload(&self) -> Result<String, ServeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render the full signed script URL for this request.
    pub fn signed_url(&self, endpoint: &str, secret: &Secret) -> Result<String, ServeError> {
        let payload = self.canonical_payload()?;
        let signature = secret.sign(&payload);
        Ok(format!(
            "{}?{}={}&{}={}",
            endpoint,
            SCRIPT_PARAM,
            urlencoding::encode(&payload),
            SIGNATURE_PARAM,
            urlencoding::encode(&signature),
        ))
    }

    /// Decode a verified payload.
    ///
    /// Checks run in layers so the reported message names the first problem:
    /// malformed JSON, then missing `options`/`widgetId`, then a non-object
    /// `options`, then the typed decode.
    pub fn decode(payload: &str) -> Result<Self, ServeError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| ServeError::PayloadMalformed(e.to_string()))?;

        let options = match (value.get("options"), value.get("widgetId")) {
            (Some(options), Some(_)) => options,
            _ => {
                return Err(ServeError::PayloadMalformed(
                    "Missing required script arguments.".to_string(),
                ));
            }
        };
        if !options.is_object() {
            return Err(ServeError::PayloadMalformed(
                "Options is not a JSON object.".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| ServeError::PayloadMalformed(e.to_string()))
    }
}

/// How the script reference is delivered alongside prerendered markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEmbed {
    /// Markup followed by a plain `<script async>` reference.
    Async,
    /// Markup wrapped in a sandboxed `<amp-script>` container.
    Sandboxed,
}

impl ScriptEmbed {
    /// Attach the script source to rendered markup for delivery.
    pub fn embed(&self, markup: Element, src: &str) -> Vec<Node> {
        match self {
            ScriptEmbed::Async => vec![
                Node::Element(markup),
                Node::Element(Element::new("script").flag("async").attr("src", src)),
            ],
            ScriptEmbed::Sandboxed => vec![Node::Element(
                Element::new("amp-script")
                    .attr("src", src)
                    .attr("sandbox", "allow-forms")
                    .child(markup),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tabledom::serialize_nodes;

    fn request() -> ScriptRequest {
        ScriptRequest::new("livetable-1", RenderOptions::default())
    }

    #[test]
    fn test_canonical_payload_key_order() {
        let payload = request().canonical_payload().unwrap();
        assert!(payload.starts_with(r#"{"options":{"#));
        assert!(payload.ends_with(r#""widgetId":"livetable-1"}"#));
    }

    #[test]
    fn test_canonical_payload_is_stable() {
        assert_eq!(
            request().canonical_payload().unwrap(),
            request().canonical_payload().unwrap()
        );
    }

    #[test]
    fn test_signed_url_round_trip() {
        let secret = Secret::new("test secret");
        let url = request().signed_url("http://localhost:8080/script", &secret).unwrap();
        assert!(url.starts_with("http://localhost:8080/script?livetable-script="));

        let query = url.split_once('?').unwrap().1;
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let payload = params.get(SCRIPT_PARAM).unwrap();
        let signature = params.get(SIGNATURE_PARAM).unwrap();
        assert!(secret.verify(payload, signature));

        let decoded = ScriptRequest::decode(payload).unwrap();
        assert_eq!(decoded, request());
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = ScriptRequest::decode("{not json").unwrap_err();
        assert!(matches!(err, ServeError::PayloadMalformed(_)));
    }

    #[test]
    fn test_decode_rejects_missing_arguments() {
        for payload in [r#"{}"#, r#"{"options":{}}"#, r#"{"widgetId":"t"}"#, r#"42"#] {
            let err = ScriptRequest::decode(payload).unwrap_err();
            assert_eq!(err.to_string(), "Missing required script arguments.");
        }
    }

    #[test]
    fn test_decode_rejects_non_object_options() {
        let err = ScriptRequest::decode(r#"{"options":[1,2],"widgetId":"t"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Options is not a JSON object.");
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let err = ScriptRequest::decode(r#"{"options":{},"widgetId":7}"#).unwrap_err();
        assert!(matches!(err, ServeError::PayloadMalformed(_)));
    }

    #[test]
    fn test_decode_fills_option_defaults() {
        let decoded = ScriptRequest::decode(r#"{"options":{"perPage":5},"widgetId":"t"}"#).unwrap();
        assert_eq!(decoded.options.per_page, 5);
        assert!(decoded.options.sortable);
    }

    #[test]
    fn test_embed_async_places_script_after_markup() {
        let markup = Element::new("div").class("dataTable-wrapper");
        let nodes = ScriptEmbed::Async.embed(markup, "http://localhost/script?x=1");
        assert_eq!(
            serialize_nodes(&nodes),
            r#"<div class="dataTable-wrapper"></div><script async src="http://localhost/script?x=1"></script>"#
        );
    }

    #[test]
    fn test_embed_sandboxed_wraps_markup() {
        let markup = Element::new("div").class("dataTable-wrapper");
        let nodes = ScriptEmbed::Sandboxed.embed(markup, "http://localhost/script");
        assert_eq!(
            serialize_nodes(&nodes),
            r#"<amp-script src="http://localhost/script" sandbox="allow-forms"><div class="dataTable-wrapper"></div></amp-script>"#
        );
    }
}

//! Widget options and host rendering preferences

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Options handed to the live table widget.
///
/// This is the wire format: it is serialized into the signed script request
/// and echoed back verbatim in the script bundle, so field order and
/// representation must stay stable. Build it from [`RenderPreferences`] via
/// [`RenderOptions::from_preferences`] rather than mutating it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub sortable: bool,
    pub searchable: bool,
    pub paging: bool,
    /// Rows shown per page. `0` disables the first-page slicing.
    pub per_page: u32,
    /// Choices for the per-page dropdown. `None` serializes as `false`,
    /// which tells the widget to omit the dropdown.
    #[serde(
        serialize_with = "some_or_false",
        deserialize_with = "false_as_none"
    )]
    pub per_page_select: Option<Vec<u32>>,
    /// Fixed body height with scrolling, e.g. `"300px"`. `None` serializes
    /// as `false`.
    #[serde(
        serialize_with = "some_or_false",
        deserialize_with = "false_as_none"
    )]
    pub scroll_y: Option<String>,
    /// Pin column widths computed from the static content.
    pub fixed_columns: bool,
    pub labels: BTreeMap<String, String>,
    pub layout: LayoutTemplates,
    pub prev_text: String,
    pub next_text: String,
    pub asc_text: String,
    pub desc_text: String,
    pub truncate_pager: bool,
    pub first_last: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sortable: true,
            searchable: true,
            paging: true,
            per_page: 10,
            per_page_select: Some(vec![10, 25, 50, 100]),
            scroll_y: None,
            fixed_columns: true,
            labels: default_labels(),
            layout: LayoutTemplates::default(),
            prev_text: "\u{2039}".to_string(),
            next_text: "\u{203a}".to_string(),
            asc_text: "\u{25b2}".to_string(),
            desc_text: "\u{25bc}".to_string(),
            truncate_pager: false,
            first_last: false,
        }
    }
}

impl RenderOptions {
    /// Derive widget options from host preferences.
    pub fn from_preferences(prefs: &RenderPreferences) -> Self {
        Self {
            sortable: prefs.sortable,
            searchable: prefs.searchable,
            paging: prefs.paging,
            per_page: prefs.per_page,
            per_page_select: prefs.per_page_choices.clone(),
            scroll_y: prefs.scroll_y.clone(),
            layout: LayoutTemplates {
                top: LayoutTemplates::default().top,
                bottom: if prefs.show_info {
                    "{info}{pager}".to_string()
                } else {
                    "{pager}".to_string()
                },
            },
            ..Self::default()
        }
    }

    /// Look up a label template, empty when the key was dropped.
    pub fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// Placement templates for the widget chrome. `{select}`, `{search}`,
/// `{info}` and `{pager}` expand; any other text is carried through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTemplates {
    pub top: String,
    pub bottom: String,
}

impl Default for LayoutTemplates {
    fn default() -> Self {
        Self {
            top: "{select}{search}".to_string(),
            bottom: "{info}{pager}".to_string(),
        }
    }
}

fn default_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("placeholder".to_string(), "Search...".to_string()),
        ("perPage".to_string(), "Show {select} entries".to_string()),
        (
            "noRows".to_string(),
            "No matching records found".to_string(),
        ),
        (
            "info".to_string(),
            "Showing {start} to {end} of {rows} entries".to_string(),
        ),
    ])
}

fn some_or_false<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

fn false_as_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FalseOr<T> {
        Flag(bool),
        Value(T),
    }

    match FalseOr::<T>::deserialize(deserializer)? {
        FalseOr::Flag(false) => Ok(None),
        FalseOr::Flag(true) => Err(D::Error::custom("expected false or a value, found true")),
        FalseOr::Value(value) => Ok(Some(value)),
    }
}

/// Host-side rendering preferences.
///
/// These are the knobs a host exposes per table; the prerenderer and the
/// script request both derive from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderPreferences {
    pub sortable: bool,
    pub searchable: bool,
    pub paging: bool,
    pub per_page: u32,
    pub per_page_choices: Option<Vec<u32>>,
    pub scroll_y: Option<String>,
    /// Render the "Showing X to Y of Z entries" line.
    pub show_info: bool,
    /// The static markup carries a header row.
    pub header_present: bool,
    /// The static markup carries a footer row.
    pub footer_present: bool,
}

impl Default for RenderPreferences {
    fn default() -> Self {
        Self {
            sortable: true,
            searchable: true,
            paging: true,
            per_page: 10,
            per_page_choices: Some(vec![10, 25, 50, 100]),
            scroll_y: None,
            show_info: true,
            header_present: true,
            footer_present: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let options = RenderOptions::default();
        let json = serde_json::to_string(&options).unwrap();
        let back: RenderOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, back);
    }

    #[test]
    fn test_disabled_fields_serialize_as_false() {
        let options = RenderOptions {
            per_page_select: None,
            scroll_y: None,
            ..RenderOptions::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"perPageSelect\":false"));
        assert!(json.contains("\"scrollY\":false"));
    }

    #[test]
    fn test_false_deserializes_as_none() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"perPageSelect":false,"scrollY":false}"#).unwrap();
        assert_eq!(options.per_page_select, None);
        assert_eq!(options.scroll_y, None);
    }

    #[test]
    fn test_values_deserialize_as_some() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"perPageSelect":[5,10],"scrollY":"300px"}"#).unwrap();
        assert_eq!(options.per_page_select, Some(vec![5, 10]));
        assert_eq!(options.scroll_y.as_deref(), Some("300px"));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let a = serde_json::to_string(&RenderOptions::default()).unwrap();
        let b = serde_json::to_string(&RenderOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_preferences_maps_layout() {
        let prefs = RenderPreferences {
            show_info: false,
            per_page: 25,
            ..RenderPreferences::default()
        };
        let options = RenderOptions::from_preferences(&prefs);
        assert_eq!(options.layout.bottom, "{pager}");
        assert_eq!(options.per_page, 25);

        let with_info = RenderOptions::from_preferences(&RenderPreferences::default());
        assert_eq!(with_info.layout.bottom, "{info}{pager}");
    }

    #[test]
    fn test_label_lookup() {
        let options = RenderOptions::default();
        assert_eq!(options.label("placeholder"), "Search...");
        assert_eq!(options.label("missing"), "");
    }
}

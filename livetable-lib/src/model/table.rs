//! Table contents as plain data

use serde::Deserialize;
use serde::Serialize;
use tabledom::Element;

/// Tabular data separated from its markup.
///
/// `rows` holds the data rows only; the header row is never counted by
/// pagination or column-width arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub header_row: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(
        header_row: impl IntoIterator<Item = impl Into<String>>,
        rows: impl IntoIterator<Item = impl IntoIterator<Item = impl Into<String>>>,
    ) -> Self {
        Self {
            header_row: header_row.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row, header included.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain([self.header_row.len()])
            .max()
            .unwrap_or(0)
    }

    /// Build conventional static markup: `table > thead + tbody`, carrying
    /// the widget id on the table element.
    pub fn to_element(&self, widget_id: &str) -> Element {
        let columns = self.column_count();
        let header = Element::new("tr").children(
            (0..columns).map(|i| {
                let text = self.header_row.get(i).map(String::as_str).unwrap_or_default();
                Element::new("th").text(text)
            }),
        );
        let body = Element::new("tbody").children(self.rows.iter().map(|row| {
            Element::new("tr").children((0..columns).map(|i| {
                let text = row.get(i).map(String::as_str).unwrap_or_default();
                Element::new("td").text(text)
            }))
        }));
        Element::new("table")
            .id(widget_id)
            .child(Element::new("thead").child(header))
            .child(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabledom::serialize;

    fn people() -> TableData {
        TableData::new(
            ["Name", "Age"],
            [["Ada", "36"], ["Grace", "85"], ["Edsger", "72"]],
        )
    }

    #[test]
    fn test_counts() {
        let data = people();
        assert_eq!(data.row_count(), 3);
        assert_eq!(data.column_count(), 2);
    }

    #[test]
    fn test_column_count_takes_widest_row() {
        let data = TableData::new(["A"], [vec!["1", "2", "3"]]);
        assert_eq!(data.column_count(), 3);
    }

    #[test]
    fn test_to_element_shape() {
        let el = people().to_element("livetable-1");
        assert_eq!(el.tag(), "table");
        assert_eq!(el.html_id(), Some("livetable-1"));

        let markup = serialize(&el);
        assert!(markup.starts_with("<table id=\"livetable-1\"><thead><tr><th>Name</th><th>Age</th></tr></thead>"));
        assert!(markup.contains("<tbody><tr><td>Ada</td><td>36</td></tr>"));
    }

    #[test]
    fn test_to_element_pads_short_rows() {
        let data = TableData::new(["A", "B"], [vec!["only"]]);
        let el = data.to_element("t");
        let markup = serialize(&el);
        assert!(markup.contains("<tr><td>only</td><td></td></tr>"));
    }

    #[test]
    fn test_round_trip_serde() {
        let data = people();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"headerRow\""));
        let back: TableData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, back);
    }
}

//! Column width computation
//!
//! Fixed-column layout pins each header cell to a percentage width derived
//! from the data, so columns keep their size when the widget flips pages or
//! filters rows.

use tabledom::Element;

use super::{data_rows, for_each_header_cell_mut};

/// Longest trimmed line of the cell's text, in characters.
fn cell_weight(cell: &Element) -> usize {
    cell.text_content()
        .lines()
        .map(|line| line.trim().chars().count())
        .max()
        .unwrap_or(0)
}

/// Per-column weights: the widest cell in each column across the data rows.
fn column_weights(table: &Element) -> Vec<usize> {
    let mut weights = Vec::new();
    for row in data_rows(table) {
        let cells = row
            .child_elements()
            .filter(|cell| matches!(cell.tag(), "td" | "th"));
        for (column, cell) in cells.enumerate() {
            if weights.len() <= column {
                weights.resize(column + 1, 0);
            }
            weights[column] = weights[column].max(cell_weight(cell));
        }
    }
    weights
}

/// Write a percentage `width` style onto each header cell.
///
/// Does nothing when the table has no data rows or only empty cells.
pub(super) fn apply_column_widths(table: &mut Element) {
    let weights = column_weights(table);
    let total: usize = weights.iter().sum();
    if total == 0 {
        return;
    }
    for_each_header_cell_mut(table, &mut |column, cell| {
        if let Some(weight) = weights.get(column) {
            let percent = *weight as f64 / total as f64 * 100.0;
            cell.set_attribute("style", format!("width: {percent:.2}%"));
        }
    });
}

//! Server-side table prerendering
//!
//! Applies the widget treatment to static table markup so the page looks
//! finished before any script runs: marker class, pinned column widths, sort
//! affordances, first-page slicing, and the surrounding widget chrome.

mod widths;
mod wrapper;

use tabledom::{Element, Node};

use crate::error::PrerenderError;
use crate::model::{RenderOptions, RenderPreferences};

/// Marker class identifying a table under widget treatment.
pub const TABLE_CLASS: &str = "dataTable-table";

/// Class carried by the widget wrapper element.
pub const WRAPPER_CLASS: &str = "dataTable-wrapper";

/// Class on the sort affordance links inside header cells.
pub const SORTER_CLASS: &str = "dataTable-sorter";

/// Outcome of prerendering one table.
#[derive(Debug, Clone)]
pub enum Prerendered {
    /// The widget treatment applied; the element is the wrapper chrome with
    /// the transformed table inside.
    Widget(Element),
    /// The table does not qualify for the widget; handed back untouched.
    Static(Element),
}

impl Prerendered {
    pub fn is_widget(&self) -> bool {
        matches!(self, Prerendered::Widget(_))
    }

    pub fn into_element(self) -> Element {
        match self {
            Prerendered::Widget(element) | Prerendered::Static(element) => element,
        }
    }
}

/// Applies the widget treatment to static tables.
///
/// # Example
///
/// ```ignore
/// use livetable_lib::model::RenderPreferences;
/// use livetable_lib::prerender::Prerenderer;
///
/// let prerenderer = Prerenderer::new(RenderPreferences::default());
/// let rendered = prerenderer.render(table)?.into_element();
/// ```
#[derive(Debug, Clone)]
pub struct Prerenderer {
    prefs: RenderPreferences,
    options: RenderOptions,
}

impl Prerenderer {
    pub fn new(prefs: RenderPreferences) -> Self {
        let options = RenderOptions::from_preferences(&prefs);
        Self { prefs, options }
    }

    /// Replace the derived widget options (custom labels, pager glyphs).
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// The options the widget will receive.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Apply the widget treatment to a static table.
    ///
    /// Returns [`Prerendered::Static`] when the table has no header row or no
    /// data rows; the widget needs both.
    pub fn render(&self, table: Element) -> Result<Prerendered, PrerenderError> {
        if table.tag() != "table" {
            return Err(PrerenderError::TableMissing {
                tag: table.tag().to_string(),
            });
        }
        if !self.prefs.header_present || !has_header_row(&table) || data_rows(&table).is_empty() {
            return Ok(Prerendered::Static(table));
        }

        let mut table = table;
        table.add_class(TABLE_CLASS);
        if self.options.fixed_columns {
            widths::apply_column_widths(&mut table);
        }
        if self.options.sortable {
            add_sort_affordances(&mut table);
        }
        if self.options.paging && self.options.per_page > 0 {
            hide_overflow_rows(&mut table, self.options.per_page as usize);
        }

        Ok(Prerendered::Widget(wrapper::wrap(
            table,
            &self.options,
            &self.prefs,
        )))
    }
}

/// Turn each header cell into a sort affordance: `data-sortable` on the cell
/// and its content moved into an anchor the widget can wire up.
fn add_sort_affordances(table: &mut Element) {
    for_each_header_cell_mut(table, &mut |_, cell| {
        cell.set_attribute("data-sortable", "");
        let mut sorter = Element::new("a")
            .attr("role", "button")
            .attr("tabindex", "0")
            .class(SORTER_CLASS);
        sorter.children = cell.take_children();
        cell.push(Node::Element(sorter));
    });
}

/// Hide every data row past the first page.
fn hide_overflow_rows(table: &mut Element, per_page: usize) {
    for_each_data_row_mut(table, &mut |index, row| {
        if index >= per_page {
            row.set_attribute("hidden", "");
        }
    });
}

fn has_header_row(table: &Element) -> bool {
    table
        .child_elements()
        .filter(|section| section.tag() == "thead")
        .flat_map(Element::child_elements)
        .filter(|row| row.tag() == "tr")
        .any(|row| row.child_elements().any(|cell| cell.tag() == "th"))
}

/// Data rows in order: `tr` under any `tbody`, plus naked `tr` directly
/// under the table. Header and footer sections never count.
pub(crate) fn data_rows(table: &Element) -> Vec<&Element> {
    let mut rows = Vec::new();
    for child in table.child_elements() {
        match child.tag() {
            "tbody" => rows.extend(child.child_elements().filter(|row| row.tag() == "tr")),
            "tr" => rows.push(child),
            _ => {}
        }
    }
    rows
}

fn for_each_data_row_mut(table: &mut Element, f: &mut impl FnMut(usize, &mut Element)) {
    let mut index = 0;
    for child in table.children.iter_mut() {
        let Node::Element(child) = child else { continue };
        match child.tag() {
            "tbody" => {
                for node in child.children.iter_mut() {
                    if let Node::Element(row) = node {
                        if row.tag() == "tr" {
                            f(index, row);
                            index += 1;
                        }
                    }
                }
            }
            "tr" => {
                f(index, child);
                index += 1;
            }
            _ => {}
        }
    }
}

/// Visit `thead` cells with their column index, resetting per row.
fn for_each_header_cell_mut(table: &mut Element, f: &mut impl FnMut(usize, &mut Element)) {
    for section in table.children.iter_mut() {
        let Node::Element(section) = section else { continue };
        if section.tag() != "thead" {
            continue;
        }
        for node in section.children.iter_mut() {
            let Node::Element(row) = node else { continue };
            if row.tag() != "tr" {
                continue;
            }
            let mut column = 0;
            for cell in row.children.iter_mut() {
                if let Node::Element(cell) = cell {
                    if cell.tag() == "th" {
                        f(column, cell);
                        column += 1;
                    }
                }
            }
        }
    }
}

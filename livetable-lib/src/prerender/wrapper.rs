//! Widget wrapper chrome
//!
//! Builds the markup shell the live widget expects around a table: top bar
//! with per-page dropdown and search box, scroll container, bottom bar with
//! the info line and pager. Layout templates decide which controls appear
//! and in what order.

use tabledom::{Element, Node};

use crate::model::{RenderOptions, RenderPreferences};

use super::{data_rows, WRAPPER_CLASS};

const PLACEHOLDERS: [&str; 4] = ["{select}", "{search}", "{info}", "{pager}"];

/// Wrap a transformed table in the widget chrome.
pub(super) fn wrap(table: Element, options: &RenderOptions, prefs: &RenderPreferences) -> Element {
    let row_count = data_rows(&table).len();

    let mut wrapper = Element::new("div").class(WRAPPER_CLASS);
    if !prefs.header_present {
        wrapper.add_class("no-header");
    }
    if !prefs.footer_present {
        wrapper.add_class("no-footer");
    }
    if options.sortable {
        wrapper.add_class("sortable");
    }
    if options.searchable {
        wrapper.add_class("searchable");
    }
    if options.fixed_columns {
        wrapper.add_class("fixed-columns");
    }

    let mut top = Element::new("div").class("dataTable-top");
    top.children = expand_template(&options.layout.top, options, row_count);

    let mut container = Element::new("div").class("dataTable-container");
    if let Some(scroll_y) = &options.scroll_y {
        container.set_attribute("style", format!("overflow-y: auto; height:{scroll_y}"));
    }
    container.push(Node::Element(table));

    let mut bottom = Element::new("div").class("dataTable-bottom");
    bottom.children = expand_template(&options.layout.bottom, options, row_count);

    wrapper.push(Node::Element(top));
    wrapper.push(Node::Element(container));
    wrapper.push(Node::Element(bottom));
    wrapper
}

/// Expand a layout template into nodes, substituting each placeholder and
/// keeping any literal text between them.
fn expand_template(template: &str, options: &RenderOptions, row_count: usize) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = template;
    loop {
        let next = PLACEHOLDERS
            .iter()
            .filter_map(|placeholder| rest.find(placeholder).map(|at| (at, *placeholder)))
            .min();
        let Some((at, placeholder)) = next else {
            if !rest.is_empty() {
                nodes.push(Node::Text(rest.to_string()));
            }
            break;
        };
        if at > 0 {
            nodes.push(Node::Text(rest[..at].to_string()));
        }
        let control = match placeholder {
            "{select}" => per_page_dropdown(options),
            "{search}" => search_box(options),
            "{info}" => info_line(options, row_count),
            "{pager}" => Some(pager(options, row_count)),
            _ => None,
        };
        nodes.extend(control.map(Node::Element));
        rest = &rest[at + placeholder.len()..];
    }
    nodes
}

/// The per-page dropdown, present only when paging with a choice list.
///
/// The `perPage` label supplies the text around the select; its `{select}`
/// marker is where the control lands.
fn per_page_dropdown(options: &RenderOptions) -> Option<Element> {
    if !options.paging {
        return None;
    }
    let choices = options.per_page_select.as_ref()?;
    if choices.is_empty() {
        return None;
    }

    let mut select = Element::new("select").class("dataTable-selector");
    for choice in choices {
        let mut option = Element::new("option");
        if *choice == options.per_page {
            option.set_attribute("selected", "");
        }
        option.push(Node::Text(choice.to_string()));
        select.push(Node::Element(option));
    }

    let mut label = Element::new("label");
    match options.label("perPage").split_once("{select}") {
        Some((before, after)) => {
            if !before.is_empty() {
                label.push(Node::Text(before.to_string()));
            }
            label.push(Node::Element(select));
            if !after.is_empty() {
                label.push(Node::Text(after.to_string()));
            }
        }
        None => {
            let text = options.label("perPage");
            if !text.is_empty() {
                label.push(Node::Text(text.to_string()));
            }
        }
    }

    Some(Element::new("div").class("dataTable-dropdown").child(label))
}

fn search_box(options: &RenderOptions) -> Option<Element> {
    if !options.searchable {
        return None;
    }
    let input = Element::new("input")
        .class("dataTable-input")
        .attr("placeholder", options.label("placeholder"))
        .attr("type", "text");
    Some(Element::new("div").class("dataTable-search").child(input))
}

/// The "Showing 1 to N of M entries" line for the first page.
fn info_line(options: &RenderOptions, row_count: usize) -> Option<Element> {
    if !options.paging {
        return None;
    }
    let end = if options.per_page > 0 {
        (options.per_page as usize).min(row_count)
    } else {
        row_count
    };
    let text = options
        .label("info")
        .replace("{start}", "1")
        .replace("{end}", &end.to_string())
        .replace("{rows}", &row_count.to_string());
    let mut info = Element::new("div").class("dataTable-info");
    info.push(Node::Text(text));
    Some(info)
}

/// The pager shell, with page links only when there is more than one page.
/// The widget owns the shell either way, so it is always emitted.
fn pager(options: &RenderOptions, row_count: usize) -> Element {
    let mut list = Element::new("ul");
    if options.paging && options.per_page > 0 {
        let page_count = row_count.div_ceil(options.per_page as usize);
        if page_count > 1 {
            list.push(Node::Element(pager_link("pager", 1, &options.prev_text)));
            for page in 1..=page_count {
                let class = if page == 1 { "active" } else { "" };
                list.push(Node::Element(pager_link(class, page, &page.to_string())));
            }
            list.push(Node::Element(pager_link(
                "pager",
                page_count,
                &options.next_text,
            )));
        }
    }
    Element::new("div").class("dataTable-pagination").child(list)
}

fn pager_link(class: &str, page: usize, text: &str) -> Element {
    let mut anchor = Element::new("a")
        .attr("role", "button")
        .attr("tabindex", "0")
        .attr("data-page", page.to_string());
    anchor.push(Node::Text(text.to_string()));
    let mut item = Element::new("li");
    if !class.is_empty() {
        item.set_attribute("class", class);
    }
    item.push(Node::Element(anchor));
    item
}

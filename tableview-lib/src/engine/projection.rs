//! Writing table state into the document.
//!
//! Everything here is an owner projection: writes are silent and never
//! invalidate listeners.

use std::collections::BTreeSet;
use std::collections::HashSet;

use tabledom::Document;
use tabledom::Element;

use crate::anchors::Anchors;
use crate::config::ColumnConfig;
use crate::config::TableConfig;
use crate::model::CellValue;
use crate::model::Direction;
use crate::model::Row;
use crate::model::RowSnapshot;
use crate::model::Sort;
use crate::query::FilterDraft;
use crate::query::Operator;
use crate::query::PageButton;
use crate::query::PageWindow;
use crate::query::QueryResult;
use crate::registry::TableEntry;
use crate::selection::CheckState;
use crate::selection::RowLookup;
use crate::selection::ToolbarState;

/// Class of the per-row selection checkbox.
pub const ROW_CHECKBOX_CLASS: &str = "row-select-checkbox";

/// Row ID of a body row: its `data-id`, or its checkbox's `data-row-id`.
pub(super) fn row_id(row: &Element) -> Option<String> {
    if let Some(id) = row.data_value("id").filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }
    row_checkbox(row)
        .and_then(|cb| cb.data_value("row-id"))
        .map(str::to_string)
}

fn row_checkbox(row: &Element) -> Option<&Element> {
    tabledom::element::collect(row, &|e| e.has_class(ROW_CHECKBOX_CLASS))
        .into_iter()
        .next()
}

/// Body rows, in document order.
fn body_rows<'a>(document: &'a Document, anchors: &Anchors) -> &'a [Element] {
    document
        .get(&anchors.body())
        .map(Element::child_elements)
        .unwrap_or_default()
}

/// Rows currently on screen, as seen by bulk-action checks.
pub(super) struct DomRows<'a> {
    pub document: &'a Document,
    pub anchors: &'a Anchors,
}

impl RowLookup for DomRows<'_> {
    fn attribute(&self, id: &str, attr: &str) -> Option<String> {
        body_rows(self.document, self.anchors)
            .iter()
            .find(|row| row_id(row).as_deref() == Some(id))
            .and_then(|row| row.data_value(attr))
            .map(str::to_string)
    }
}

/// IDs of visible rows that offer a selection checkbox.
pub(super) fn checkable_rows(document: &Document, anchors: &Anchors) -> Vec<String> {
    body_rows(document, anchors)
        .iter()
        .filter(|row| !row.hidden && row_checkbox(row).is_some())
        .filter_map(row_id)
        .collect()
}

/// Read local rows from the body's `data-*` attributes.
///
/// Rows are given their canonical element IDs so later projections can
/// address them. Returns `None` when the body has no identifiable rows.
pub(super) fn read_rows(document: &mut Document, anchors: &Anchors) -> Option<Vec<Row>> {
    let mut rows = Vec::new();
    document.with_element(&anchors.body(), |body| {
        for element in body.child_elements_mut() {
            let Some(id) = row_id(element) else {
                continue;
            };
            let mut row = Row::new(id.clone());
            for (key, value) in &element.data {
                if key != "id" && key != "filter-hidden" {
                    row.attributes
                        .insert(key.clone(), CellValue::Text(value.clone()));
                }
            }
            element.id = anchors.row(&id);
            element.data.insert("id".to_string(), id);
            rows.push(row);
        }
    });
    if rows.is_empty() { None } else { Some(rows) }
}

/// Build a body row for a local row. Cells of hidden columns are hidden.
pub(super) fn render_row(
    anchors: &Anchors,
    row: &Row,
    config: &TableConfig,
    hidden_columns: &BTreeSet<String>,
) -> Element {
    let cell = |key: &str, text: String| {
        Element::new("td")
            .data("column", key)
            .hidden(hidden_columns.contains(key))
            .content(text)
    };

    let mut tr = Element::new("tr").id(anchors.row(&row.id)).data("id", row.id.clone());
    for (key, value) in &row.attributes {
        tr = tr.data(key.clone(), value.to_text());
    }
    if config.bulk_enabled {
        let checkbox = Element::checkbox()
            .id(anchors.row_checkbox(&row.id))
            .class(ROW_CHECKBOX_CLASS)
            .data("row-id", row.id.clone());
        tr = tr.child(Element::new("td").child(checkbox));
    }
    if config.columns.is_empty() {
        for (key, value) in &row.attributes {
            tr = tr.child(cell(key, value.to_text()));
        }
    } else {
        for column in &config.columns {
            tr = tr.child(cell(&column.key, row.text(&column.key)));
        }
    }
    tr
}

/// Order and hide local rows according to a query result.
pub(super) fn project_local_rows(
    document: &mut Document,
    anchors: &Anchors,
    snapshot: &RowSnapshot,
    result: &QueryResult,
) {
    let visible: HashSet<usize> = result.visible.iter().copied().collect();
    let order: Vec<String> = snapshot.ids().map(|id| anchors.row(id)).collect();
    document.reorder_children(&anchors.body(), &order);
    for (index, row) in snapshot.rows().iter().enumerate() {
        let element_id = anchors.row(&row.id);
        document.set_hidden(&element_id, !visible.contains(&index));
        let filter_hidden = if snapshot.is_filter_hidden(index) { "true" } else { "false" };
        document.set_data(&element_id, "filter-hidden", filter_hidden);
    }
}

/// Footer counts, prev/next state and the page-button strip.
pub(super) fn project_footer(document: &mut Document, anchors: &Anchors, window: &PageWindow, page_size: u32) {
    document.set_text(&anchors.start(), window.summary.start.to_string());
    document.set_text(&anchors.end(), window.summary.end.to_string());
    document.set_text(&anchors.total(), window.summary.total.to_string());
    document.set_disabled(&anchors.prev(), !window.prev_enabled);
    document.set_disabled(&anchors.next(), !window.next_enabled);
    document.with_element(&anchors.page_size(), |select| {
        select.attrs.insert("value".to_string(), page_size.to_string());
    });

    let buttons = window
        .buttons
        .iter()
        .map(|button| match button {
            PageButton::Page { number, active } => {
                let mut element = Element::button()
                    .id(anchors.page_button(*number))
                    .class("page-btn")
                    .data("page", number.to_string())
                    .content(number.to_string());
                if *active {
                    element = element.class("active").attr("aria-current", "page");
                }
                element
            }
            PageButton::Ellipsis => Element::new("span").class("page-ellipsis").content("..."),
        })
        .collect();
    document.set_children(&anchors.pages(), buttons);
}

/// Sort indicators on sortable headers.
pub(super) fn project_headers(document: &mut Document, anchors: &Anchors, sort: Option<&Sort>) {
    let Some(table) = document.get_mut(anchors.table()) else {
        return;
    };
    tabledom::element::for_each_mut(
        table,
        &|e| e.tag == "th" && e.data.contains_key("sort"),
        &mut |th| {
            let column = th.data_value("sort").unwrap_or_default().to_string();
            let direction = sort.filter(|s| s.column == column).map(|s| s.direction);
            th.set_class("sort-asc", direction == Some(Direction::Asc));
            th.set_class("sort-desc", direction == Some(Direction::Desc));
        },
    );
}

/// Column key of a header or body cell: `data-column`, or a header's
/// `data-sort`.
fn column_key(cell: &Element) -> Option<&str> {
    match cell.tag.as_str() {
        "th" => cell.data_value("column").or_else(|| cell.data_value("sort")),
        "td" => cell.data_value("column"),
        _ => None,
    }
}

/// Hide the cells of hidden columns and sync the columns menu.
pub(super) fn project_columns(document: &mut Document, anchors: &Anchors, hidden: &BTreeSet<String>) {
    if let Some(table) = document.get_mut(anchors.table()) {
        tabledom::element::for_each_mut(
            table,
            &|e| column_key(e).is_some(),
            &mut |cell| {
                let key = column_key(cell).unwrap_or_default();
                cell.hidden = hidden.contains(key);
            },
        );
    }
    document.with_element(&anchors.columns(), |menu| {
        tabledom::element::for_each_mut(
            menu,
            &|e| e.data.contains_key("column"),
            &mut |checkbox| {
                let key = checkbox.data_value("column").unwrap_or_default();
                checkbox.checked = !hidden.contains(key);
            },
        );
    });
}

/// Panel IDs named by `data-toggle` controls in the table's card.
fn panel_targets(document: &Document, anchors: &Anchors) -> Vec<String> {
    let Some(card) = document.get(&anchors.card()) else {
        return Vec::new();
    };
    tabledom::element::collect(card, &|e| e.data.contains_key("toggle"))
        .into_iter()
        .filter_map(|e| e.data_value("toggle"))
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .collect()
}

/// Panels that are open as the document stands.
pub(super) fn read_open_panels(document: &Document, anchors: &Anchors) -> BTreeSet<String> {
    panel_targets(document, anchors)
        .into_iter()
        .filter(|target| document.get(target).is_some_and(|panel| !panel.hidden))
        .collect()
}

/// Open or close every toggled panel, and mark its controls.
pub(super) fn project_panels(document: &mut Document, anchors: &Anchors, open: &BTreeSet<String>) {
    for target in panel_targets(document, anchors) {
        let is_open = open.contains(&target);
        document.with_element(&target, |panel| {
            panel.hidden = !is_open;
            panel.set_class("open", is_open);
        });
    }
    document.with_element(&anchors.card(), |card| {
        tabledom::element::for_each_mut(
            card,
            &|e| e.data.contains_key("toggle"),
            &mut |control| {
                let is_open = control
                    .data_value("toggle")
                    .is_some_and(|target| open.contains(target));
                control.set_class("active", is_open);
                control
                    .attrs
                    .insert("aria-expanded".to_string(), is_open.to_string());
            },
        );
    });
}

/// Row highlighting, select-all state and the bulk toolbar.
pub(super) fn project_selection(document: &mut Document, anchors: &Anchors, entry: &TableEntry) {
    let selection = &entry.view.selection;
    let toolbar = {
        let checkable = checkable_rows(document, anchors);
        let rows = DomRows {
            document: &*document,
            anchors,
        };
        ToolbarState::compute(
            selection,
            checkable.iter().map(String::as_str),
            &entry.config.bulk_actions,
            &rows,
        )
    };

    document.with_element(&anchors.body(), |body| {
        for row in body.child_elements_mut() {
            let Some(id) = row_id(row) else {
                continue;
            };
            let selected = selection.is_selected(&id);
            row.set_class("selected", selected);
            tabledom::element::for_each_mut(
                row,
                &|e| e.has_class(ROW_CHECKBOX_CLASS),
                &mut |cb| cb.checked = selected,
            );
        }
    });

    document.with_element(&anchors.select_all(), |cb| {
        cb.checked = toolbar.select_all == CheckState::Checked;
        cb.indeterminate = toolbar.select_all == CheckState::Indeterminate;
    });

    let mode = if toolbar.bulk_mode { "true" } else { "false" };
    document.set_data(&anchors.bulk(), "bulk-mode", mode);
    document.set_text(&anchors.bulk_count(), toolbar.count.to_string());
    document.with_element(&anchors.bulk(), |bulk| {
        tabledom::element::for_each_mut(
            bulk,
            &|e| e.data.contains_key("bulk-action"),
            &mut |button| {
                let key = button.data_value("bulk-action").unwrap_or_default();
                let enabled = toolbar.is_enabled(key);
                button.disabled = !enabled;
                button.hidden = !enabled;
            },
        );
    });
}

/// Render the filter draft into the panel's row container.
pub(super) fn project_filter_panel(
    document: &mut Document,
    anchors: &Anchors,
    draft: &FilterDraft,
    columns: &[ColumnConfig],
) {
    if !document.contains(&anchors.filter_rows()) {
        return;
    }
    let rows = draft
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let field = |tag: &str, name: &str, value: &str| {
                Element::new(tag)
                    .id(format!("{}-{name}", anchors.filter_row(index)))
                    .class(format!("filter-{name}"))
                    .data("filter-index", index.to_string())
                    .data("filter-field", name)
                    .attr("value", value)
            };

            let mut element = Element::div().id(anchors.filter_row(index)).class("filter-row");
            if index > 0 {
                let logic: Vec<Element> = ["and", "or"]
                    .into_iter()
                    .map(|c| Element::new("option").attr("value", c).content(c.to_uppercase()))
                    .collect();
                element = element.child(field("select", "logic", row.connector.as_str()).children(logic));
            }
            let column_options: Vec<Element> = columns
                .iter()
                .filter(|c| c.sortable)
                .map(|c| Element::new("option").attr("value", c.key.clone()).content(c.label.clone()))
                .collect();
            let operator_options: Vec<Element> = Operator::ALL
                .into_iter()
                .map(|op| Element::new("option").attr("value", op.as_str()).content(op.as_str()))
                .collect();
            element
                .child(field("select", "column", &row.column).children(column_options))
                .child(field("select", "operator", row.operator.as_str()).children(operator_options))
                .child(field("input", "value", &row.value).hidden(row.operator.is_unary()))
                .child(
                    Element::button()
                        .id(format!("{}-remove", anchors.filter_row(index)))
                        .class("filter-remove")
                        .data("filter-remove", index.to_string())
                        .content("Remove"),
                )
        })
        .collect();
    document.set_children(&anchors.filter_rows(), rows);
    document.set_data(&anchors.filters(), "active-count", draft.to_filters().len().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BulkActionConfig;
    use crate::registry::Registry;

    const CARD: &str = r#"
<div id="t-card">
  <div id="t-bulk" data-bulk-mode="false">
    <span id="t-bulk-count">0</span>
    <button id="t-bulk-delete" data-bulk-action="delete">Delete</button>
  </div>
  <table id="t">
    <thead><tr><th><input type="checkbox" id="t-select-all"/></th><th id="t-th-name" data-sort="name">Name</th></tr></thead>
    <tbody id="t-body">
      <tr data-id="1" data-deletable="true"><td><input type="checkbox" class="row-select-checkbox" data-row-id="1"/></td><td>Ada</td></tr>
      <tr data-id="2" data-deletable="false"><td><input type="checkbox" class="row-select-checkbox" data-row-id="2"/></td><td>Bob</td></tr>
    </tbody>
  </table>
</div>"#;

    #[test]
    fn test_read_rows_assigns_ids() {
        let mut doc = Document::parse(CARD).unwrap();
        let anchors = Anchors::new("t");
        let rows = read_rows(&mut doc, &anchors).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].text("deletable"), "false");
        assert!(doc.contains("t-row-2"));
    }

    #[test]
    fn test_selection_projection() {
        let mut doc = Document::parse(CARD).unwrap();
        let anchors = Anchors::new("t");
        let config = TableConfig::local("t")
            .with_bulk_action(BulkActionConfig::new("delete", "Delete").with_requires_attr("deletable"));
        let mut registry = Registry::new();
        let (entry, _) = registry.get_or_create(config, 25, std::time::Duration::ZERO);
        entry.view.selection.set("1", true);
        entry.view.selection.set("2", true);

        project_selection(&mut doc, &anchors, entry);
        let select_all = doc.get("t-select-all").unwrap();
        assert!(select_all.checked);
        assert_eq!(doc.get("t-bulk").unwrap().data_value("bulk-mode"), Some("true"));
        assert_eq!(doc.get("t-bulk-count").unwrap().text_content(), "2");
        assert!(doc.get("t-bulk-delete").unwrap().hidden);

        entry.view.selection.set("2", false);
        project_selection(&mut doc, &anchors, entry);
        assert!(doc.get("t-select-all").unwrap().indeterminate);
        assert!(!doc.get("t-bulk-delete").unwrap().disabled);
    }

    #[test]
    fn test_header_classes() {
        let mut doc = Document::parse(CARD).unwrap();
        let anchors = Anchors::new("t");
        project_headers(&mut doc, &anchors, Some(&Sort::desc("name")));
        assert!(doc.get("t-th-name").unwrap().has_class("sort-desc"));
        project_headers(&mut doc, &anchors, None);
        assert!(!doc.get("t-th-name").unwrap().has_class("sort-desc"));
    }

    #[test]
    fn test_footer_strip() {
        let mut doc = Document::parse(
            r#"<div id="t-footer"><span id="t-start"/><span id="t-end"/><span id="t-total"/>
               <button id="t-prev">Prev</button><div id="t-pages"/><button id="t-next">Next</button></div>"#,
        )
        .unwrap();
        let anchors = Anchors::new("t");
        let window = crate::query::offset_window(1, 25, 130, 7);
        project_footer(&mut doc, &anchors, &window, 25);

        assert_eq!(doc.get("t-end").unwrap().text_content(), "25");
        assert!(doc.get("t-prev").unwrap().disabled);
        assert!(!doc.get("t-next").unwrap().disabled);
        assert_eq!(doc.get("t-pages").unwrap().child_elements().len(), 6);
        assert!(doc.get("t-page-1").unwrap().has_class("active"));
    }
}

//! Selection, sort and filter-panel event handlers.

use tabledom::Event;

use super::Notice;
use super::TableEngine;
use super::projection;
use super::projection::ROW_CHECKBOX_CLASS;
use crate::anchors::Anchors;
use crate::model::Sort;
use crate::model::TableId;
use crate::model::ViewDelta;
use crate::query::DraftField;
use crate::selection::Selection;

impl TableEngine {
    // =========================================================================
    // Selection
    // =========================================================================

    pub(super) fn on_row_check(&mut self, table: &str, event: &Event) {
        let Some(checkbox) = self.document.get(event.target()) else {
            return;
        };
        if !checkbox.has_class(ROW_CHECKBOX_CLASS) {
            return;
        }
        let checked = checkbox.checked;
        let id = match checkbox.data_value("row-id") {
            Some(id) => Some(id.to_string()),
            None => self
                .closest(event.target(), |e| e.tag == "tr" && e.data.contains_key("id"))
                .and_then(|row| row.data_value("id"))
                .map(str::to_string),
        };
        let Some(id) = id else {
            log::warn!("Row checkbox {} has no row ID", event.target());
            return;
        };
        self.update_selection(table, |selection, _| selection.set(&id, checked));
    }

    pub(super) fn on_select_all(&mut self, table: &str, event: &Event) {
        let checked = self.document.get(event.target()).is_some_and(|e| e.checked);
        self.update_selection(table, |selection, checkable| {
            let ids = checkable.iter().map(String::as_str);
            if checked {
                selection.select_all(ids)
            } else {
                selection.deselect_all(ids)
            }
        });
    }

    /// Run `change` against a table's selection and the rows currently
    /// offered for selection. A change re-projects and raises one notice.
    pub(super) fn update_selection(
        &mut self,
        table: &str,
        change: impl FnOnce(&mut Selection, &[String]) -> bool,
    ) -> bool {
        let anchors = Anchors::new(table);
        let checkable = projection::checkable_rows(&self.document, &anchors);
        let Some(entry) = self.registry.get_mut(table) else {
            return false;
        };
        if !change(&mut entry.view.selection, &checkable) {
            return false;
        }
        let count = entry.view.selection.len();
        projection::project_selection(&mut self.document, &anchors, entry);
        log::debug!("Selection of {table}: {count} rows");
        self.notices.push(Notice::SelectionChanged {
            table: TableId::new(table),
            count,
        });
        true
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    pub(super) async fn on_header_click(&mut self, table: &str, event: &Event) {
        let Some(column) = self
            .closest(event.target(), |e| e.tag == "th" && e.data.contains_key("sort"))
            .and_then(|th| th.data_value("sort"))
            .filter(|c| !c.is_empty())
            .map(str::to_string)
        else {
            return;
        };
        let Some(entry) = self.registry.get(table) else {
            return;
        };
        let sortable = entry
            .config
            .columns
            .iter()
            .find(|c| c.key == column)
            .is_none_or(|c| c.sortable);
        if !sortable {
            log::debug!("Column {column} of {table} is not sortable");
            return;
        }
        let sort = match &entry.view.sort {
            Some(current) if current.column == column => Sort {
                column,
                direction: current.direction.toggled(),
            },
            _ => Sort::asc(column),
        };
        self.navigate(table, ViewDelta::Sort(sort)).await;
    }

    // =========================================================================
    // Filter panel
    // =========================================================================

    pub(super) fn on_filter_add(&mut self, table: &str) {
        if let Some(entry) = self.registry.get_mut(table) {
            let index = entry.filter_draft.add_condition();
            log::debug!("Added filter row {index} to {table}");
        }
        self.render_filter_panel(table);
    }

    pub(super) async fn on_filter_apply(&mut self, table: &str) {
        let Some(entry) = self.registry.get(table) else {
            return;
        };
        let filters = entry.filter_draft.to_filters();
        log::debug!("Applying {} filters to {table}", filters.len());
        self.navigate(table, ViewDelta::Filters(filters)).await;
        self.render_filter_panel(table);
    }

    pub(super) async fn on_filter_clear(&mut self, table: &str) {
        if let Some(entry) = self.registry.get_mut(table) {
            entry.filter_draft.clear();
        }
        self.navigate(table, ViewDelta::ClearFilters).await;
        self.render_filter_panel(table);
    }

    pub(super) fn on_filter_edit(&mut self, table: &str, event: &Event) {
        let Some(target) = self.document.get(event.target()) else {
            return;
        };

        if let Event::Click { .. } = event {
            let index = self
                .closest(event.target(), |e| e.data.contains_key("filter-remove"))
                .and_then(|e| e.data_value("filter-remove"))
                .and_then(|i| i.parse::<usize>().ok());
            if let Some(index) = index
                && let Some(entry) = self.registry.get_mut(table)
                && entry.filter_draft.remove_condition(index)
            {
                self.render_filter_panel(table);
            }
            return;
        }

        let index = target
            .data_value("filter-index")
            .and_then(|i| i.parse::<usize>().ok());
        let field = target.data_value("filter-field").and_then(DraftField::parse);
        let (Some(index), Some(field)) = (index, field) else {
            return;
        };
        let value = target.value().to_string();
        let Some(entry) = self.registry.get_mut(table) else {
            return;
        };
        if !entry.filter_draft.set_field(index, field, &value) {
            log::debug!("Ignoring {} edit on filter row {index} of {table}", field.as_str());
            return;
        }
        // Text edits keep the panel as typed.
        if field != DraftField::Value {
            self.render_filter_panel(table);
        }
    }

    // =========================================================================
    // Panels and columns
    // =========================================================================

    pub(super) fn on_toggle_panel(&mut self, table: &str, event: &Event) {
        let Some(target) = self
            .closest(event.target(), |e| e.data.contains_key("toggle"))
            .and_then(|e| e.data_value("toggle"))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
        else {
            return;
        };
        let anchors = Anchors::new(table);
        let Some(entry) = self.registry.get_mut(table) else {
            return;
        };
        let open = entry.open_panels.insert(target.clone());
        if !open {
            entry.open_panels.remove(&target);
        }
        log::debug!("Panel {target} of {table} {}", if open { "opened" } else { "closed" });
        projection::project_panels(&mut self.document, &anchors, &entry.open_panels);
    }

    pub(super) fn on_column_toggle(&mut self, table: &str, event: &Event) {
        let Some(checkbox) = self.document.get(event.target()) else {
            return;
        };
        let Some(column) = checkbox.data_value("column").map(str::to_string) else {
            return;
        };
        let visible = checkbox.checked;
        self.set_column_visible(table, &column, visible);
    }

    fn render_filter_panel(&mut self, table: &str) {
        let anchors = Anchors::new(table);
        if let Some(entry) = self.registry.get(table) {
            projection::project_filter_panel(
                &mut self.document,
                &anchors,
                &entry.filter_draft,
                &entry.config.columns,
            );
        }
    }
}

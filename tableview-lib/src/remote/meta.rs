//! Authoritative pagination metadata from server responses.

use tabledom::Element;

use crate::model::CursorTokens;
use crate::model::Direction;
use crate::model::Pagination;
use crate::model::Sort;
use crate::model::TableView;

/// Pagination state reported by the server in `data-*` attributes.
///
/// Every field is optional; absent fields leave the view unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationMeta {
    pub current_page: Option<u32>,
    pub page_size: Option<u32>,
    pub total_rows: Option<usize>,
    pub search: Option<String>,
    pub sort_column: Option<String>,
    pub sort_direction: Option<Direction>,
    pub has_next: Option<bool>,
    pub has_prev: Option<bool>,
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

impl PaginationMeta {
    /// Read metadata from an element's `data-*` attributes.
    pub fn from_element(element: &Element) -> Self {
        let text = |key: &str| element.data_value(key).map(str::to_string);
        let flag = |key: &str| element.data_value(key).map(|v| v == "true");
        Self {
            current_page: element.data_value("current-page").and_then(|v| v.parse().ok()),
            page_size: element
                .data_value("page-size")
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0),
            total_rows: element.data_value("total-rows").and_then(|v| v.parse().ok()),
            search: text("search"),
            sort_column: text("sort-column"),
            sort_direction: element.data_value("sort-direction").and_then(Direction::parse),
            has_next: flag("has-next"),
            has_prev: flag("has-prev"),
            next_cursor: text("next-cursor"),
            prev_cursor: text("prev-cursor"),
        }
    }

    /// The view's pagination state, with every field filled in.
    pub fn from_view(view: &TableView) -> Self {
        let mut meta = Self {
            page_size: Some(view.page_size),
            total_rows: Some(view.total_rows),
            search: Some(view.search.clone()),
            sort_column: Some(view.sort.as_ref().map(|s| s.column.clone()).unwrap_or_default()),
            sort_direction: view.sort.as_ref().map(|s| s.direction),
            ..Default::default()
        };
        match &view.pagination {
            Pagination::Offset { page } => meta.current_page = Some(*page),
            Pagination::Cursor {
                tokens,
                has_next,
                has_prev,
            } => {
                meta.has_next = Some(*has_next);
                meta.has_prev = Some(*has_prev);
                meta.next_cursor = Some(tokens.next.clone().unwrap_or_default());
                meta.prev_cursor = Some(tokens.prev.clone().unwrap_or_default());
            }
        }
        meta
    }

    /// Store every present field as a `data-*` attribute of `element`.
    pub fn write_to(&self, element: &mut Element) {
        let fields = [
            ("current-page", self.current_page.map(|v| v.to_string())),
            ("page-size", self.page_size.map(|v| v.to_string())),
            ("total-rows", self.total_rows.map(|v| v.to_string())),
            ("search", self.search.clone()),
            ("sort-column", self.sort_column.clone()),
            ("sort-direction", self.sort_direction.map(|d| d.as_str().to_string())),
            ("has-next", self.has_next.map(|v| v.to_string())),
            ("has-prev", self.has_prev.map(|v| v.to_string())),
            ("next-cursor", self.next_cursor.clone()),
            ("prev-cursor", self.prev_cursor.clone()),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                element.data.insert(key.to_string(), value);
            }
        }
    }

    /// Overwrite the view with every reported field.
    pub fn apply_to(&self, view: &mut TableView) {
        if let Some(size) = self.page_size {
            view.page_size = size;
        }
        if let Some(total) = self.total_rows {
            view.total_rows = total;
        }
        if let Some(search) = &self.search {
            view.search = search.clone();
        }
        if let Some(column) = &self.sort_column {
            if column.is_empty() {
                view.sort = None;
            } else {
                view.sort = Some(Sort {
                    column: column.clone(),
                    direction: self.sort_direction.unwrap_or_default(),
                });
            }
        } else if let (Some(sort), Some(direction)) = (&mut view.sort, self.sort_direction) {
            sort.direction = direction;
        }

        match &mut view.pagination {
            Pagination::Offset { page } => {
                if let Some(current) = self.current_page {
                    *page = current.max(1);
                }
            }
            Pagination::Cursor {
                tokens,
                has_next,
                has_prev,
            } => {
                *tokens = CursorTokens {
                    next: non_empty(&self.next_cursor),
                    prev: non_empty(&self.prev_cursor),
                };
                *has_next = self.has_next.unwrap_or(tokens.next.is_some());
                *has_prev = self.has_prev.unwrap_or(tokens.prev.is_some());
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

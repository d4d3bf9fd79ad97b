//! Local-mode query evaluation over a row snapshot.

use super::FilterList;
use super::PageWindow;
use super::normalize_term;
use super::offset_window;
use super::row_matches;
use super::sorted_order;
use crate::model::Pagination;
use crate::model::RowSnapshot;
use crate::model::Sort;
use crate::model::TableView;
use crate::query::cursor_window;

/// The result of evaluating a view against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Snapshot indices matching search and filters, in snapshot order.
    pub matched: Vec<usize>,
    /// Snapshot indices shown on the current page.
    pub visible: Vec<usize>,
    pub window: PageWindow,
}

/// Recompute the cached per-row filter result.
pub fn refresh_filter_cache(snapshot: &mut RowSnapshot, filters: &FilterList) {
    let hidden = snapshot
        .rows()
        .iter()
        .map(|row| !filters.evaluate(row))
        .collect();
    snapshot.set_filter_hidden(hidden);
}

/// Stable-sort the snapshot in place.
pub fn apply_sort(snapshot: &mut RowSnapshot, sort: &Sort) {
    let order = sorted_order(snapshot.rows(), sort);
    snapshot.permute(&order);
}

/// Evaluate search, cached filters and pagination for `view`.
///
/// The page is clamped and `view.total_rows` is updated to the number of
/// matching rows, so calling this twice gives the same result.
pub fn evaluate(
    snapshot: &RowSnapshot,
    view: &mut TableView,
    search_columns: &[String],
    threshold: u32,
) -> QueryResult {
    let term = normalize_term(&view.search);
    let matched: Vec<usize> = snapshot
        .rows()
        .iter()
        .enumerate()
        .filter(|(i, row)| !snapshot.is_filter_hidden(*i) && row_matches(row, &term, search_columns))
        .map(|(i, _)| i)
        .collect();
    view.total_rows = matched.len();

    let window = match &mut view.pagination {
        Pagination::Offset { page } => {
            let window = offset_window(*page, view.page_size, matched.len(), threshold);
            *page = window.page;
            window
        }
        Pagination::Cursor { .. } => {
            let shown = matched.len().min(view.page_size as usize);
            cursor_window(shown, false, false)
        }
    };

    let visible = matched[window.range.clone()].to_vec();
    QueryResult {
        matched,
        visible,
        window,
    }
}

//! Local-mode evaluation: sort, filter, search and paginate the snapshot,
//! then project the result.

use tabledom::Document;

use super::projection;
use crate::anchors::Anchors;
use crate::config::EngineConfig;
use crate::query::FooterSummary;
use crate::query::QueryResult;
use crate::query::apply_sort;
use crate::query::cursor_window;
use crate::query::evaluate;
use crate::query::refresh_filter_cache;
use crate::registry::TableEntry;

/// Recompute a local table and write rows and footer into the document.
///
/// A table without a page-size selector is not paginated: every matching
/// row is shown and the footer counts against the whole snapshot.
pub(super) fn evaluate_and_project(
    document: &mut Document,
    config: &EngineConfig,
    anchors: &Anchors,
    entry: &mut TableEntry,
) -> QueryResult {
    if let Some(sort) = entry.view.sort.clone() {
        apply_sort(&mut entry.rows, &sort);
    }
    refresh_filter_cache(&mut entry.rows, &entry.view.filters);

    let search_columns = entry.config.search_columns();
    let mut result = evaluate(
        &entry.rows,
        &mut entry.view,
        &search_columns,
        config.page_window_threshold,
    );
    if !document.contains(&anchors.page_size()) {
        let shown = result.matched.len();
        result.window = cursor_window(shown, false, false);
        result.window.summary = FooterSummary {
            start: if shown > 0 { 1 } else { 0 },
            end: shown,
            total: entry.rows.len(),
        };
        result.visible = result.matched.clone();
    }

    projection::project_local_rows(document, anchors, &entry.rows, &result);
    projection::project_footer(document, anchors, &result.window, entry.view.page_size);
    log::debug!(
        "Rendered {}: {} of {} rows visible",
        anchors.table(),
        result.visible.len(),
        entry.rows.len()
    );
    result
}

//! Free-text search over row text.

use crate::model::Row;

/// Trim and lowercase a raw search term.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Whether a row's text contains an already-normalized term.
///
/// `columns` limits the attributes searched; empty means all of them.
/// An empty term matches every row.
pub fn row_matches(row: &Row, term: &str, columns: &[String]) -> bool {
    if term.is_empty() {
        return true;
    }
    if columns.is_empty() {
        row.attributes
            .values()
            .any(|value| value.to_text().to_lowercase().contains(term))
    } else {
        columns
            .iter()
            .any(|column| row.text(column).to_lowercase().contains(term))
    }
}

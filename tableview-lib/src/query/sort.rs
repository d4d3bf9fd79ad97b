//! Column comparison and stable row ordering.

use std::cmp::Ordering;

use crate::model::CellValue;
use crate::model::Direction;
use crate::model::Row;
use crate::model::Sort;
use crate::model::parse_number;

/// Compare two cell texts: numerically when both parse as finite numbers,
/// otherwise case-insensitively.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.trim().to_lowercase().cmp(&b.trim().to_lowercase()),
    }
}

/// Compare two cell values with the same rules as [`compare_text`].
pub fn compare_values(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    let x = a.and_then(CellValue::as_number);
    let y = b.and_then(CellValue::as_number);
    match (x, y) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => {
            let a = a.map(CellValue::to_text).unwrap_or_default();
            let b = b.map(CellValue::to_text).unwrap_or_default();
            a.trim().to_lowercase().cmp(&b.trim().to_lowercase())
        }
    }
}

/// Compare two rows on a sort column, honouring direction.
pub fn compare_rows(a: &Row, b: &Row, sort: &Sort) -> Ordering {
    let ordering = compare_values(a.get(&sort.column), b.get(&sort.column));
    match sort.direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

/// Indices of `rows` in sorted order. Ties keep their input order.
pub fn sorted_order(rows: &[Row], sort: &Sort) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&i, &j| compare_rows(&rows[i], &rows[j], sort));
    order
}

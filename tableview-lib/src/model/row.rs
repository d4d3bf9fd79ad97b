//! Typed row snapshot

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::CellValue;

/// One row: a stable identifier plus its attribute values.
///
/// # Example
///
/// ```
/// use tableview_lib::model::Row;
///
/// let row = Row::new("7").set("name", "Ada").set("deletable", true);
/// assert_eq!(row.text("name"), "Ada");
/// assert!(row.flag("deletable"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Sets an attribute value (builder pattern).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.attributes.get(key)
    }

    /// Display text of an attribute; missing attributes read as empty.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(CellValue::to_text).unwrap_or_default()
    }

    /// `true` when the attribute reads as the literal text `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.text(key) == "true"
    }
}

/// The local-mode row set, with the cached per-row filter result.
#[derive(Debug, Clone, Default)]
pub struct RowSnapshot {
    rows: Vec<Row>,
    filter_hidden: Vec<bool>,
}

impl RowSnapshot {
    pub fn new(rows: Vec<Row>) -> Self {
        let filter_hidden = vec![false; rows.len()];
        Self {
            rows,
            filter_hidden,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.id.as_str())
    }

    pub fn is_filter_hidden(&self, index: usize) -> bool {
        self.filter_hidden.get(index).copied().unwrap_or(false)
    }

    pub fn set_filter_hidden(&mut self, hidden: Vec<bool>) {
        debug_assert_eq!(hidden.len(), self.rows.len());
        self.filter_hidden = hidden;
    }

    /// Forget cached filter results, e.g. when the table turns remote.
    pub fn clear_filter_cache(&mut self) {
        self.filter_hidden = vec![false; self.rows.len()];
    }

    /// Reorder rows (and their cached flags) by a permutation of indices.
    pub fn permute(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.rows.len());
        let rows = order.iter().map(|&i| self.rows[i].clone()).collect();
        let hidden = order.iter().map(|&i| self.is_filter_hidden(i)).collect();
        self.rows = rows;
        self.filter_hidden = hidden;
    }
}

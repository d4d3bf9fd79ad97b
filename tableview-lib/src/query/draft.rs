//! The editable filter panel behind a table's applied filters.

use super::Connector;
use super::FilterCondition;
use super::FilterList;
use super::Operator;

/// One row of the filter panel as the user left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRow {
    /// Empty until a column is chosen.
    pub column: String,
    pub operator: Operator,
    pub value: String,
    /// Ignored on the first row.
    pub connector: Connector,
}

impl Default for DraftRow {
    fn default() -> Self {
        Self {
            column: String::new(),
            operator: Operator::Contains,
            value: String::new(),
            connector: Connector::And,
        }
    }
}

/// A field of a draft row, as addressed by panel controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Column,
    Operator,
    Value,
    Connector,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Column => "column",
            DraftField::Operator => "operator",
            DraftField::Value => "value",
            DraftField::Connector => "logic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "column" => Some(DraftField::Column),
            "operator" => Some(DraftField::Operator),
            "value" => Some(DraftField::Value),
            "logic" => Some(DraftField::Connector),
            _ => None,
        }
    }
}

/// Ordered, editable filter rows. Nothing here affects the table until
/// [`FilterDraft::to_filters`] is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDraft {
    rows: Vec<DraftRow>,
}

impl FilterDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft showing the currently applied filters.
    pub fn from_filters(filters: &FilterList) -> Self {
        let rows = filters
            .iter()
            .map(|c| DraftRow {
                column: c.column.clone(),
                operator: c.operator,
                value: c.value.clone().unwrap_or_default(),
                connector: c.connector.unwrap_or_default(),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append an empty row. Returns its index.
    pub fn add_condition(&mut self) -> usize {
        self.rows.push(DraftRow::default());
        self.rows.len() - 1
    }

    /// Remove a row along with its connector.
    pub fn remove_condition(&mut self, index: usize) -> bool {
        if index < self.rows.len() {
            self.rows.remove(index);
            true
        } else {
            false
        }
    }

    pub fn set_connector(&mut self, index: usize, connector: Connector) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.connector = connector;
                true
            }
            None => false,
        }
    }

    /// Set one field from a control's text value. Unknown operator or
    /// connector names are ignored.
    pub fn set_field(&mut self, index: usize, field: DraftField, value: &str) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        match field {
            DraftField::Column => row.column = value.to_string(),
            DraftField::Value => row.value = value.to_string(),
            DraftField::Operator => match Operator::parse(value) {
                Some(op) => row.operator = op,
                None => return false,
            },
            DraftField::Connector => match Connector::parse(value) {
                Some(c) => row.connector = c,
                None => return false,
            },
        }
        true
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// The conditions this draft describes. Rows without a column are
    /// skipped, as is the value of unary operators.
    pub fn to_filters(&self) -> FilterList {
        let mut filters = FilterList::new();
        for row in self.rows.iter().filter(|r| !r.column.trim().is_empty()) {
            let condition = if row.operator.is_unary() {
                FilterCondition::unary(row.column.trim(), row.operator)
            } else {
                FilterCondition::new(row.column.trim(), row.operator, row.value.clone())
            };
            filters.push(condition.with_connector(row.connector));
        }
        filters
    }
}

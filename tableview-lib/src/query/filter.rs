//! Filter conditions, their left-to-right evaluation and wire encoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::Serialize;

use crate::error::CodecError;
use crate::error::ConditionError;
use crate::model::Row;

/// Comparison applied by a filter condition.
///
/// All comparisons are case-insensitive on the cell's display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Cell text contains the value.
    Contains,
    /// Cell text equals the value.
    Equals,
    /// Cell text starts with the value.
    StartsWith,
    /// Cell text ends with the value.
    EndsWith,
    /// Cell text differs from the value.
    NotEquals,
    /// Cell text is empty.
    IsEmpty,
    /// Cell text is not empty.
    IsNotEmpty,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Contains,
        Operator::Equals,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::NotEquals,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
    ];

    /// Unary operators ignore the condition's value.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Contains => "contains",
            Operator::Equals => "equals",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::NotEquals => "not_equals",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    fn compare(self, cell: &str, needle: &str) -> bool {
        match self {
            Operator::Contains => cell.contains(needle),
            Operator::Equals => cell == needle,
            Operator::StartsWith => cell.starts_with(needle),
            Operator::EndsWith => cell.ends_with(needle),
            Operator::NotEquals => cell != needle,
            Operator::IsEmpty => cell.is_empty(),
            Operator::IsNotEmpty => !cell.is_empty(),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a condition joins the running result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "and",
            Connector::Or => "or",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Some(Connector::And),
            "or" => Some(Connector::Or),
            _ => None,
        }
    }
}

/// One filter condition.
///
/// The wire form is `{"column", "operator", "value", "logic"}`; `logic` is
/// the connector joining this condition to the ones before it.
///
/// # Example
///
/// ```
/// use tableview_lib::model::Row;
/// use tableview_lib::query::{FilterCondition, Operator};
///
/// let row = Row::new("1").set("status", "Active");
/// assert!(FilterCondition::new("status", Operator::Equals, "active").matches(&row));
/// assert!(!FilterCondition::unary("status", Operator::IsEmpty).matches(&row));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCondition {
    pub column: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, rename = "logic", skip_serializing_if = "Option::is_none")]
    pub connector: Option<Connector>,
}

impl FilterCondition {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: Some(value.into()),
            connector: None,
        }
    }

    /// A condition for an operator that takes no value.
    pub fn unary(column: impl Into<String>, operator: Operator) -> Self {
        Self {
            column: column.into(),
            operator,
            value: None,
            connector: None,
        }
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn validate(&self) -> Result<(), ConditionError> {
        if self.column.trim().is_empty() {
            return Err(ConditionError::MissingColumn);
        }
        if !self.operator.is_unary() && self.value.is_none() {
            return Err(ConditionError::MissingValue {
                column: self.column.clone(),
                operator: self.operator.to_string(),
            });
        }
        Ok(())
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.matches_text(&row.text(&self.column))
    }

    /// Compare against a cell's display text.
    pub fn matches_text(&self, cell: &str) -> bool {
        let cell = cell.to_lowercase();
        let needle = self.value.as_deref().unwrap_or("").to_lowercase();
        self.operator.compare(&cell, &needle)
    }
}

/// An ordered list of conditions folded left to right.
///
/// The first condition never carries a connector; every later one does.
/// Evaluation has no operator precedence: `A or B and C` is `(A or B) and C`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterList {
    conditions: Vec<FilterCondition>,
}

impl FilterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded conditions, normalizing connectors.
    pub fn from_conditions(conditions: impl IntoIterator<Item = FilterCondition>) -> Self {
        let mut list = Self::new();
        for condition in conditions {
            let connector = condition.connector.unwrap_or_default();
            list.push(condition.with_connector(connector));
        }
        list
    }

    /// Append a condition. Its connector is dropped if it is first and
    /// defaults to `And` otherwise.
    pub fn push(&mut self, mut condition: FilterCondition) {
        condition.connector = if self.conditions.is_empty() {
            None
        } else {
            Some(condition.connector.unwrap_or_default())
        };
        self.conditions.push(condition);
    }

    /// Remove a condition. Removing the first promotes the next one,
    /// which loses its connector.
    pub fn remove(&mut self, index: usize) -> Option<FilterCondition> {
        if index >= self.conditions.len() {
            return None;
        }
        let removed = self.conditions.remove(index);
        if let Some(first) = self.conditions.first_mut() {
            first.connector = None;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.conditions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterCondition> {
        self.conditions.iter()
    }

    pub fn as_slice(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Fold the conditions over a row. An empty list matches everything.
    pub fn evaluate(&self, row: &Row) -> bool {
        let mut conditions = self.conditions.iter();
        let Some(first) = conditions.next() else {
            return true;
        };
        conditions.fold(first.matches(row), |acc, condition| {
            let matched = condition.matches(row);
            match condition.connector.unwrap_or_default() {
                Connector::And => acc && matched,
                Connector::Or => acc || matched,
            }
        })
    }

    /// Wire form, or `None` when there is nothing to send.
    pub fn encode(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        match encode_filters(&self.conditions) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                log::error!("Failed to encode filters: {e}");
                None
            }
        }
    }

    /// Parse the wire form, failing open to an empty list.
    pub fn decode(encoded: &str) -> Self {
        Self::from_conditions(decode_filters(encoded))
    }
}

impl<'a> IntoIterator for &'a FilterList {
    type Item = &'a FilterCondition;
    type IntoIter = std::slice::Iter<'a, FilterCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.iter()
    }
}

/// Serialize conditions as base64-encoded JSON.
pub fn encode_filters(conditions: &[FilterCondition]) -> Result<String, CodecError> {
    let json = serde_json::to_string(conditions)?;
    Ok(STANDARD.encode(json))
}

/// Decode the opaque `filters` parameter. Malformed input yields no filters.
pub fn decode_filters(encoded: &str) -> Vec<FilterCondition> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Vec::new();
    }
    match try_decode_filters(encoded) {
        Ok(conditions) => conditions,
        Err(e) => {
            log::warn!("Ignoring undecodable filters parameter: {e}");
            Vec::new()
        }
    }
}

/// Decode the opaque `filters` parameter, reporting why it failed.
pub fn try_decode_filters(encoded: &str) -> Result<Vec<FilterCondition>, CodecError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    let json = String::from_utf8(bytes)?;
    let conditions: Vec<FilterCondition> = serde_json::from_str(&json)?;
    for condition in &conditions {
        condition.validate()?;
    }
    Ok(conditions)
}

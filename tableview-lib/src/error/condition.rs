//! Filter condition validation errors

/// A filter condition that cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// Binary operators compare against a value.
    #[error("Operator {operator} on column {column:?} requires a value")]
    MissingValue { column: String, operator: String },

    #[error("Filter condition has no column")]
    MissingColumn,
}

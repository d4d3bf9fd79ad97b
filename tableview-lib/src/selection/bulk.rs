//! Bulk toolbar state derived from the selection.

use super::CheckState;
use super::Selection;
use crate::config::BulkActionConfig;

/// Looks up per-row attributes for the rows currently on screen.
pub trait RowLookup {
    /// The attribute's text for row `id`, or `None` if the row is not on
    /// screen or lacks the attribute.
    fn attribute(&self, id: &str, attr: &str) -> Option<String>;
}

/// Whether a bulk action may run against the current selection.
///
/// Actions without a required attribute are enabled whenever anything is
/// selected. Otherwise every selected row must carry `attr == "true"`;
/// selected rows that can't be found count as non-matching.
pub fn action_enabled(action: &BulkActionConfig, selection: &Selection, rows: &dyn RowLookup) -> bool {
    if selection.is_empty() {
        return false;
    }
    match &action.requires_attr {
        None => true,
        Some(attr) => selection
            .iter()
            .all(|id| rows.attribute(id, attr).as_deref() == Some("true")),
    }
}

/// Rendered state of a table's bulk toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    /// `true` while anything is selected.
    pub bulk_mode: bool,
    pub count: usize,
    pub select_all: CheckState,
    /// `(action key, enabled)` in configuration order.
    pub actions: Vec<(String, bool)>,
}

impl ToolbarState {
    pub fn compute<'a>(
        selection: &Selection,
        checkable: impl IntoIterator<Item = &'a str>,
        actions: &[BulkActionConfig],
        rows: &dyn RowLookup,
    ) -> Self {
        Self {
            bulk_mode: !selection.is_empty(),
            count: selection.len(),
            select_all: selection.check_state(checkable),
            actions: actions
                .iter()
                .map(|action| (action.key.clone(), action_enabled(action, selection, rows)))
                .collect(),
        }
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.actions
            .iter()
            .any(|(k, enabled)| k == key && *enabled)
    }
}

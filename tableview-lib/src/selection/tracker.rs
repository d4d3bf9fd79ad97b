//! Selected row IDs and the state derived from them.

use std::collections::HashSet;

/// Tracks selected rows by ID.
///
/// Selection survives re-initialization and navigation; it is only cleared
/// explicitly or after a bulk action succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<String>,
}

/// Visual state of a select-all checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set selection for an ID explicitly. Returns true if selection changed.
    pub fn set(&mut self, id: &str, selected: bool) -> bool {
        if selected {
            self.selected.insert(id.to_string())
        } else {
            self.selected.remove(id)
        }
    }

    /// Select every ID given. Returns true if selection changed.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let mut changed = false;
        for id in ids {
            changed |= self.selected.insert(id.to_string());
        }
        changed
    }

    /// Deselect every ID given. Returns true if selection changed.
    pub fn deselect_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        let mut changed = false;
        for id in ids {
            changed |= self.selected.remove(id);
        }
        changed
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Clear all selections. Returns true if anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Selected IDs in a stable order, for requests and display.
    pub fn sorted(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Select-all state relative to the rows currently offered for selection.
    pub fn check_state<'a>(&self, checkable: impl IntoIterator<Item = &'a str>) -> CheckState {
        let mut total = 0;
        let mut selected = 0;
        for id in checkable {
            total += 1;
            if self.is_selected(id) {
                selected += 1;
            }
        }
        if selected == 0 {
            CheckState::Unchecked
        } else if selected == total {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        }
    }
}

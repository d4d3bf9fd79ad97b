//! Per-table view state

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::config::PaginationMode;
use crate::config::TableConfig;
use crate::config::TableMode;
use crate::query::FilterList;
use crate::selection::Selection;

/// Identifier of a table instance on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TableId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    /// Parse `asc`/`desc`, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

/// A sort on one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub column: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// Opaque server-issued cursors for the neighbouring pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorTokens {
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Where the current page sits.
///
/// Offset pagination tracks a 1-based page number. Cursor pagination has no
/// page number at all, only server-issued tokens and availability flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pagination {
    Offset {
        page: u32,
    },
    Cursor {
        tokens: CursorTokens,
        has_next: bool,
        has_prev: bool,
    },
}

impl Pagination {
    pub fn first(mode: PaginationMode) -> Self {
        match mode {
            PaginationMode::Offset => Pagination::Offset { page: 1 },
            PaginationMode::Cursor => Pagination::Cursor {
                tokens: CursorTokens::default(),
                has_next: false,
                has_prev: false,
            },
        }
    }

    pub fn mode(&self) -> PaginationMode {
        match self {
            Pagination::Offset { .. } => PaginationMode::Offset,
            Pagination::Cursor { .. } => PaginationMode::Cursor,
        }
    }

    /// The offset page number, if in offset mode.
    pub fn page(&self) -> Option<u32> {
        match self {
            Pagination::Offset { page } => Some(*page),
            Pagination::Cursor { .. } => None,
        }
    }

    /// Back to the first page, discarding any cursors.
    pub fn reset(&mut self) {
        *self = Pagination::first(self.mode());
    }
}

/// Everything that determines what a table shows.
#[derive(Debug, Clone)]
pub struct TableView {
    pub id: TableId,
    pub mode: TableMode,
    pub pagination: Pagination,
    pub page_size: u32,
    /// Rows matching the current search and filters (local), or the
    /// server-reported total (remote).
    pub total_rows: usize,
    pub sort: Option<Sort>,
    pub search: String,
    pub filters: FilterList,
    pub selection: Selection,
    /// Column keys the user has hidden.
    pub hidden_columns: BTreeSet<String>,
}

impl TableView {
    pub fn new(config: &TableConfig, default_page_size: u32) -> Self {
        Self {
            id: config.id.clone(),
            mode: config.mode.clone(),
            pagination: Pagination::first(config.pagination),
            page_size: config.page_size.unwrap_or(default_page_size).max(1),
            total_rows: 0,
            sort: None,
            search: String::new(),
            filters: FilterList::new(),
            selection: Selection::new(),
            hidden_columns: config
                .columns
                .iter()
                .filter(|c| c.hidden)
                .map(|c| c.key.clone())
                .collect(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.mode, TableMode::Remote(_))
    }

    /// Show or hide a column. Returns `true` if visibility changed.
    pub fn set_column_visible(&mut self, key: &str, visible: bool) -> bool {
        if visible {
            self.hidden_columns.remove(key)
        } else {
            self.hidden_columns.insert(key.to_string())
        }
    }

    pub fn is_column_visible(&self, key: &str) -> bool {
        !self.hidden_columns.contains(key)
    }

    /// Current offset page, or 1 in cursor mode.
    pub fn page(&self) -> u32 {
        self.pagination.page().unwrap_or(1)
    }

    /// Apply a view change. Shape changes reset to the first page.
    ///
    /// Returns `true` if anything changed. Page navigation is clamped by the
    /// caller once the matching row count is known.
    pub fn apply(&mut self, delta: &ViewDelta) -> bool {
        match delta {
            ViewDelta::GoToPage(page) => match &mut self.pagination {
                Pagination::Offset { page: current } => {
                    let target = (*page).max(1);
                    let changed = *current != target;
                    *current = target;
                    changed
                }
                Pagination::Cursor { .. } => false,
            },
            ViewDelta::NextPage => match &mut self.pagination {
                Pagination::Offset { page } => {
                    *page = page.saturating_add(1);
                    true
                }
                Pagination::Cursor { .. } => false,
            },
            ViewDelta::PrevPage => match &mut self.pagination {
                Pagination::Offset { page } if *page > 1 => {
                    *page -= 1;
                    true
                }
                _ => false,
            },
            ViewDelta::SetPageSize(size) => {
                let size = (*size).max(1);
                let changed = self.page_size != size;
                self.page_size = size;
                self.pagination.reset();
                changed
            }
            ViewDelta::Search(term) => {
                let changed = self.search != *term;
                self.search = term.clone();
                self.pagination.reset();
                changed
            }
            ViewDelta::Sort(sort) => {
                let changed = self.sort.as_ref() != Some(sort);
                self.sort = Some(sort.clone());
                self.pagination.reset();
                changed
            }
            ViewDelta::Filters(filters) => {
                let changed = self.filters != *filters;
                self.filters = filters.clone();
                self.pagination.reset();
                changed
            }
            ViewDelta::ClearFilters => {
                let changed = !self.filters.is_empty();
                self.filters.clear();
                self.pagination.reset();
                changed
            }
            ViewDelta::Refresh => false,
        }
    }
}

/// A requested change to a table's view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewDelta {
    GoToPage(u32),
    NextPage,
    PrevPage,
    SetPageSize(u32),
    Search(String),
    Sort(Sort),
    Filters(FilterList),
    ClearFilters,
    /// Re-fetch or recompute without changing the view.
    Refresh,
}

impl ViewDelta {
    /// Deltas that change which rows match and so restart pagination.
    pub fn resets_page(&self) -> bool {
        matches!(
            self,
            ViewDelta::SetPageSize(_)
                | ViewDelta::Search(_)
                | ViewDelta::Sort(_)
                | ViewDelta::Filters(_)
                | ViewDelta::ClearFilters
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnConfig;
    use crate::query::FilterCondition;
    use crate::query::Operator;

    fn view() -> TableView {
        TableView::new(&TableConfig::local("users"), 25)
    }

    #[test]
    fn test_shape_changes_reset_page() {
        let mut view = view();
        view.apply(&ViewDelta::GoToPage(4));
        assert_eq!(view.page(), 4);

        view.apply(&ViewDelta::Search("ada".to_string()));
        assert_eq!(view.page(), 1);

        view.apply(&ViewDelta::GoToPage(3));
        view.apply(&ViewDelta::Sort(Sort::desc("name")));
        assert_eq!(view.page(), 1);

        view.apply(&ViewDelta::GoToPage(3));
        let mut filters = FilterList::new();
        filters.push(FilterCondition::new("name", Operator::Contains, "a"));
        view.apply(&ViewDelta::Filters(filters));
        assert_eq!(view.page(), 1);

        view.apply(&ViewDelta::GoToPage(2));
        view.apply(&ViewDelta::SetPageSize(50));
        assert_eq!((view.page(), view.page_size), (1, 50));
    }

    #[test]
    fn test_prev_stops_at_first_page() {
        let mut view = view();
        assert!(!view.apply(&ViewDelta::PrevPage));
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_cursor_mode_has_no_page_number() {
        let config = TableConfig::local("users").with_pagination(PaginationMode::Cursor);
        let mut view = TableView::new(&config, 25);
        assert!(!view.apply(&ViewDelta::GoToPage(3)));
        assert_eq!(view.pagination.page(), None);
    }

    #[test]
    fn test_column_visibility() {
        let config = TableConfig::local("users")
            .with_column(ColumnConfig::new("name", "Name"))
            .with_column(ColumnConfig::new("email", "Email").hidden());
        let mut view = TableView::new(&config, 25);
        assert!(!view.is_column_visible("email"));

        assert!(view.set_column_visible("email", true));
        assert!(!view.set_column_visible("email", true));
        assert!(view.set_column_visible("name", false));
        assert_eq!(view.hidden_columns.iter().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("DESC"), Some(Direction::Desc));
        assert_eq!(Direction::parse("up"), None);
        assert_eq!(Direction::Asc.toggled(), Direction::Desc);
    }
}

//! Element IDs a table's markup is expected to carry.
//!
//! | ID | Element |
//! |----|---------|
//! | `{id}-card` | container replaced by full renders |
//! | `{id}` | the table; delegated row listeners live here |
//! | `{id}-body` | row container |
//! | `{id}-footer` | pagination footer |
//! | `{id}-meta` | pagination metadata (server responses only) |
//! | `{id}-select-all` | header checkbox |
//! | `{id}-bulk` | bulk toolbar, carries `data-bulk-mode` |
//! | `{id}-search` | search input |
//! | `{id}-filters` | filter panel |
//! | `{id}-filter-rows` | draft rows inside the filter panel |
//! | `{id}-columns` | column visibility menu, one `data-column` checkbox per column |
//!
//! Inside the card, any element with `data-toggle="<panel id>"` opens and
//! closes that panel.

/// Derives element IDs from a table ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchors {
    table: String,
}

impl Anchors {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    fn suffixed(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn card(&self) -> String {
        self.suffixed("card")
    }

    pub fn body(&self) -> String {
        self.suffixed("body")
    }

    pub fn footer(&self) -> String {
        self.suffixed("footer")
    }

    pub fn meta(&self) -> String {
        self.suffixed("meta")
    }

    // Footer

    pub fn prev(&self) -> String {
        self.suffixed("prev")
    }

    pub fn next(&self) -> String {
        self.suffixed("next")
    }

    pub fn pages(&self) -> String {
        self.suffixed("pages")
    }

    pub fn page_size(&self) -> String {
        self.suffixed("size")
    }

    pub fn start(&self) -> String {
        self.suffixed("start")
    }

    pub fn end(&self) -> String {
        self.suffixed("end")
    }

    pub fn total(&self) -> String {
        self.suffixed("total")
    }

    pub fn page_button(&self, page: u32) -> String {
        format!("{}-page-{page}", self.table)
    }

    // Selection

    pub fn select_all(&self) -> String {
        self.suffixed("select-all")
    }

    pub fn bulk(&self) -> String {
        self.suffixed("bulk")
    }

    pub fn bulk_count(&self) -> String {
        self.suffixed("bulk-count")
    }

    pub fn bulk_select_all(&self) -> String {
        self.suffixed("bulk-select-all")
    }

    pub fn bulk_cancel(&self) -> String {
        self.suffixed("bulk-cancel")
    }

    pub fn row(&self, id: &str) -> String {
        format!("{}-row-{id}", self.table)
    }

    pub fn row_checkbox(&self, id: &str) -> String {
        format!("{}-check-{id}", self.table)
    }

    // Toolbar

    pub fn search(&self) -> String {
        self.suffixed("search")
    }

    pub fn filters(&self) -> String {
        self.suffixed("filters")
    }

    /// Container the filter draft rows are rendered into.
    pub fn filter_rows(&self) -> String {
        self.suffixed("filter-rows")
    }

    pub fn filter_row(&self, index: usize) -> String {
        format!("{}-filter-{index}", self.table)
    }

    pub fn filter_apply(&self) -> String {
        self.suffixed("filter-apply")
    }

    pub fn filter_clear(&self) -> String {
        self.suffixed("filter-clear")
    }

    pub fn filter_add(&self) -> String {
        self.suffixed("filter-add")
    }

    pub fn columns(&self) -> String {
        self.suffixed("columns")
    }

    /// Whether `id` is one of this table's replaceable regions.
    pub fn owns_region(&self, id: &str) -> bool {
        id == self.table || id == self.card() || id == self.body() || id == self.footer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        let anchors = Anchors::new("users");
        assert_eq!(anchors.card(), "users-card");
        assert_eq!(anchors.row_checkbox("7"), "users-check-7");
        assert_eq!(anchors.page_button(3), "users-page-3");
        assert!(anchors.owns_region("users-footer"));
        assert!(!anchors.owns_region("users-search"));
    }
}

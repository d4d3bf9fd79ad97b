//! Engine and per-table configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tabledom::Document;
use tabledom::Element;

use crate::model::Direction;
use crate::model::Sort;
use crate::model::TableId;

/// Engine-wide settings.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tableview_lib::config::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_default_page_size(50)
///     .with_remote_search_debounce(Duration::from_millis(500));
/// assert_eq!(config.page_window_threshold, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Page size when a table doesn't set one, and the value omitted from
    /// request and address parameters.
    ///
    /// Default: 25
    pub default_page_size: u32,

    /// Choices offered by the page-size selector.
    pub page_size_options: Vec<u32>,

    /// Quiet period before a local search applies.
    ///
    /// Default: 200ms
    #[serde(with = "millis")]
    pub local_search_debounce: Duration,

    /// Quiet period before a remote search is requested.
    ///
    /// Default: 300ms
    #[serde(with = "millis")]
    pub remote_search_debounce: Duration,

    /// Interval of the fallback poll for replaced content.
    ///
    /// Default: 2s
    #[serde(with = "millis")]
    pub reconcile_interval: Duration,

    /// Page counts up to this show every page button.
    ///
    /// Default: 7
    pub page_window_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            page_size_options: vec![10, 25, 50, 100],
            local_search_debounce: Duration::from_millis(200),
            remote_search_debounce: Duration::from_millis(300),
            reconcile_interval: Duration::from_secs(2),
            page_window_threshold: 7,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    pub fn with_page_size_options(mut self, options: Vec<u32>) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn with_local_search_debounce(mut self, wait: Duration) -> Self {
        self.local_search_debounce = wait;
        self
    }

    pub fn with_remote_search_debounce(mut self, wait: Duration) -> Self {
        self.remote_search_debounce = wait;
        self
    }

    pub fn with_reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = interval;
        self
    }

    pub fn with_page_window_threshold(mut self, threshold: u32) -> Self {
        self.page_window_threshold = threshold;
        self
    }

    /// Parse from JSON, filling in defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

mod millis {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// =============================================================================
// Per-table configuration
// =============================================================================

/// How a table pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    #[default]
    Offset,
    Cursor,
}

/// Server endpoints of a remote table. Paths resolve against the current
/// address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoints {
    /// Renders the whole table card.
    pub pagination_url: String,
    /// Renders only body, footer and metadata, for targeted patches.
    #[serde(default)]
    pub body_url: Option<String>,
    /// Renders the card after a mutation.
    #[serde(default)]
    pub refresh_url: Option<String>,
}

impl RemoteEndpoints {
    pub fn new(pagination_url: impl Into<String>) -> Self {
        Self {
            pagination_url: pagination_url.into(),
            body_url: None,
            refresh_url: None,
        }
    }

    pub fn with_body_url(mut self, url: impl Into<String>) -> Self {
        self.body_url = Some(url.into());
        self
    }

    pub fn with_refresh_url(mut self, url: impl Into<String>) -> Self {
        self.refresh_url = Some(url.into());
        self
    }
}

/// Where a table's rows come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableMode {
    /// All rows are held client-side.
    #[default]
    Local,
    /// Rows are rendered by a server per request.
    Remote(RemoteEndpoints),
}

/// Visual emphasis of a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Default,
    Primary,
    Warning,
    Danger,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Default => "default",
            Variant::Primary => "primary",
            Variant::Warning => "warning",
            Variant::Danger => "danger",
        }
    }
}

/// A toolbar action applied to every selected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionConfig {
    pub key: String,
    pub label: String,
    /// POST target. Without one, the action is left to the host.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub confirm_title: Option<String>,
    /// May contain `{{count}}`.
    #[serde(default)]
    pub confirm_message: Option<String>,
    /// JSON object of extra form fields.
    #[serde(default)]
    pub extra_params: Option<String>,
    /// Row attribute that must be `"true"` on every selected row.
    #[serde(default)]
    pub requires_attr: Option<String>,
    #[serde(default)]
    pub variant: Variant,
}

impl BulkActionConfig {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            endpoint: None,
            confirm_title: None,
            confirm_message: None,
            extra_params: None,
            requires_attr: None,
            variant: Variant::Default,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_confirm(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.confirm_title = Some(title.into());
        self.confirm_message = Some(message.into());
        self
    }

    pub fn with_extra_params(mut self, json: impl Into<String>) -> Self {
        self.extra_params = Some(json.into());
        self
    }

    pub fn with_requires_attr(mut self, attr: impl Into<String>) -> Self {
        self.requires_attr = Some(attr.into());
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }
}

/// A displayed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    pub label: String,
    #[serde(default = "yes")]
    pub sortable: bool,
    #[serde(default = "yes")]
    pub searchable: bool,
    /// Starts out hidden; the user can show it from the columns menu.
    #[serde(default)]
    pub hidden: bool,
}

fn yes() -> bool {
    true
}

impl ColumnConfig {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            searchable: true,
            hidden: false,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn unsearchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Configuration of one table instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub id: TableId,
    pub mode: TableMode,
    pub pagination: PaginationMode,
    /// Overrides [`EngineConfig::default_page_size`].
    pub page_size: Option<u32>,
    /// Applied once on first initialization, without leaving page 1.
    pub default_sort: Option<Sort>,
    pub bulk_enabled: bool,
    pub bulk_actions: Vec<BulkActionConfig>,
    pub columns: Vec<ColumnConfig>,
}

impl TableConfig {
    pub fn local(id: impl Into<TableId>) -> Self {
        Self {
            id: id.into(),
            mode: TableMode::Local,
            pagination: PaginationMode::Offset,
            page_size: None,
            default_sort: None,
            bulk_enabled: false,
            bulk_actions: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn remote(id: impl Into<TableId>, endpoints: RemoteEndpoints) -> Self {
        Self {
            mode: TableMode::Remote(endpoints),
            ..Self::local(id)
        }
    }

    pub fn with_pagination(mut self, mode: PaginationMode) -> Self {
        self.pagination = mode;
        self
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    pub fn with_default_sort(mut self, sort: Sort) -> Self {
        self.default_sort = Some(sort);
        self
    }

    pub fn with_bulk_action(mut self, action: BulkActionConfig) -> Self {
        self.bulk_enabled = true;
        self.bulk_actions.push(action);
        self
    }

    pub fn with_bulk_enabled(mut self, enabled: bool) -> Self {
        self.bulk_enabled = enabled;
        self
    }

    pub fn with_column(mut self, column: ColumnConfig) -> Self {
        self.columns.push(column);
        self
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.mode, TableMode::Remote(_))
    }

    pub fn endpoints(&self) -> Option<&RemoteEndpoints> {
        match &self.mode {
            TableMode::Remote(endpoints) => Some(endpoints),
            TableMode::Local => None,
        }
    }

    pub fn bulk_action(&self, key: &str) -> Option<&BulkActionConfig> {
        self.bulk_actions.iter().find(|a| a.key == key)
    }

    /// Columns searched by free text; empty means every attribute.
    pub fn search_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| c.key.clone())
            .collect()
    }

    /// Read a table's configuration from the `data-*` attributes of its
    /// card (`{id}-card`) and table (`{id}`) elements.
    ///
    /// Returns `None` if the table element is missing.
    pub fn discover(document: &Document, id: &str) -> Option<Self> {
        let table = document.get(id)?;
        let card = document.get(&format!("{id}-card"));
        let read = |key: &str| -> Option<String> {
            table
                .data_value(key)
                .or_else(|| card.and_then(|c| c.data_value(key)))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let mut config = Self::local(id);
        if let Some(pagination_url) = read("pagination-url") {
            let server = read("server-pagination").is_none_or(|v| v == "true");
            if server {
                config.mode = TableMode::Remote(RemoteEndpoints {
                    pagination_url,
                    body_url: read("pagination-body-url"),
                    refresh_url: read("refresh-url"),
                });
            }
        }
        if read("pagination-mode").as_deref() == Some("cursor") {
            config.pagination = PaginationMode::Cursor;
        }
        config.page_size = read("page-size").and_then(|s| s.parse().ok()).filter(|&n| n > 0);
        config.default_sort = read("default-sort").map(|column| Sort {
            column,
            direction: read("default-direction")
                .and_then(|d| Direction::parse(&d))
                .unwrap_or_default(),
        });
        config.bulk_enabled = read("bulk-enabled").as_deref() == Some("true");

        let scope = card.unwrap_or(table);
        config.bulk_actions = tabledom::element::collect(scope, &|e| e.data.contains_key("bulk-action"))
            .into_iter()
            .map(bulk_action_from_element)
            .collect();
        config.columns = tabledom::element::collect(table, &|e| e.tag == "th" && e.data.contains_key("sort"))
            .into_iter()
            .filter_map(|th| {
                let key = th.data_value("sort")?.to_string();
                Some(ColumnConfig::new(key, th.text_content()))
            })
            .collect();

        Some(config)
    }
}

fn bulk_action_from_element(button: &Element) -> BulkActionConfig {
    let attr = |key: &str| button.data_value(key).filter(|v| !v.is_empty()).map(str::to_string);
    let variant = if button.has_class("bulk-action-danger") {
        Variant::Danger
    } else if button.has_class("bulk-action-primary") {
        Variant::Primary
    } else if button.has_class("bulk-action-warning") {
        Variant::Warning
    } else {
        Variant::Default
    };
    let key = attr("bulk-action").unwrap_or_default();
    let label = button.text_content();
    BulkActionConfig {
        label: if label.is_empty() { key.clone() } else { label },
        key,
        endpoint: attr("endpoint"),
        confirm_title: attr("confirm-title"),
        confirm_message: attr("confirm-message"),
        extra_params: attr("extra-params"),
        requires_attr: attr("requires-attr"),
        variant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults_from_partial_json() {
        let config = EngineConfig::from_json(r#"{"default_page_size": 50, "local_search_debounce": 100}"#)
            .unwrap();
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.local_search_debounce, Duration::from_millis(100));
        assert_eq!(config.remote_search_debounce, Duration::from_millis(300));
        assert_eq!(config.page_size_options, vec![10, 25, 50, 100]);
    }

    #[test]
    fn test_discover_remote_table() {
        let doc = Document::parse(
            r#"<div id="users-card" class="table-card" data-bulk-enabled="true" data-refresh-url="/users/card">
                 <div id="users-bulk">
                   <button data-bulk-action="delete" class="bulk-action-danger" data-endpoint="/users/delete"
                           data-requires-attr="deletable" data-confirm-message="Delete {{count}}?"><span>Delete</span></button>
                 </div>
                 <table id="users" data-server-pagination="true" data-pagination-url="/users/card"
                        data-pagination-body-url="/users/body" data-pagination-mode="cursor"
                        data-default-sort="name" data-default-direction="desc" data-page-size="10">
                   <thead><tr><th data-sort="name">Name</th><th>Actions</th></tr></thead>
                   <tbody id="users-body"></tbody>
                 </table>
               </div>"#,
        )
        .unwrap();

        let config = TableConfig::discover(&doc, "users").unwrap();
        let endpoints = config.endpoints().unwrap();
        assert_eq!(endpoints.pagination_url, "/users/card");
        assert_eq!(endpoints.body_url.as_deref(), Some("/users/body"));
        assert_eq!(endpoints.refresh_url.as_deref(), Some("/users/card"));
        assert_eq!(config.pagination, PaginationMode::Cursor);
        assert_eq!(config.page_size, Some(10));
        assert_eq!(config.default_sort, Some(Sort::desc("name")));
        assert!(config.bulk_enabled);

        let delete = config.bulk_action("delete").unwrap();
        assert_eq!(delete.label, "Delete");
        assert_eq!(delete.variant, Variant::Danger);
        assert_eq!(delete.requires_attr.as_deref(), Some("deletable"));
        assert_eq!(config.columns.len(), 1);
        assert_eq!(config.columns[0].key, "name");
    }

    #[test]
    fn test_discover_missing_table() {
        let doc = Document::parse(r#"<div id="other"></div>"#).unwrap();
        assert!(TableConfig::discover(&doc, "users").is_none());
    }
}

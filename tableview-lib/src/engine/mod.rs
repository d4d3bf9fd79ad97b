//! The table engine: owns the document, listeners and per-table state,
//! and routes user events to the pagination, filter, sort, selection and
//! sync logic.

mod actions;
mod bind;
mod handlers;
mod local;
mod projection;
mod remote;

use std::sync::Arc;

use tabledom::Document;
use tabledom::Event;
use tabledom::Listeners;
use tabledom::apply_form_state;
use tokio::time::Instant;
use url::Url;

pub use bind::Action;
pub use bind::Binding;
pub use projection::ROW_CHECKBOX_CLASS;
pub use remote::SyncOutcome;

use crate::anchors::Anchors;
use crate::collab::ConfirmDialog;
use crate::collab::Drawer;
use crate::config::EngineConfig;
use crate::config::TableConfig;
use crate::error::Error;
use crate::history::AddressBar;
use crate::model::Pagination;
use crate::model::Row;
use crate::model::RowSnapshot;
use crate::model::TableId;
use crate::model::TableView;
use crate::model::ViewDelta;
use crate::query::FilterDraft;
use crate::reconcile::ReconcileTimer;
use crate::registry::Facet;
use crate::registry::Registry;
use crate::registry::TableEntry;
use crate::remote::PaginationMeta;
use crate::remote::RenderService;

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A table's selection changed. Fires once per user action.
    SelectionChanged { table: TableId, count: usize },
    /// A bulk action without an endpoint was triggered; the host runs it.
    BulkAction {
        table: TableId,
        action: String,
        ids: Vec<String>,
    },
}

/// Owns a page's tables.
///
/// All methods run on one task; I/O happens only inside the `async`
/// methods, at remote sync and action boundaries.
///
/// # Example
///
/// ```
/// use tabledom::Document;
/// use tableview_lib::config::TableConfig;
/// use tableview_lib::engine::TableEngine;
/// use tableview_lib::model::Row;
///
/// let document = Document::parse(r#"<div id="users-card"><table id="users"><tbody id="users-body"/></table></div>"#)
///     .unwrap();
/// let mut engine = TableEngine::builder().document(document).build();
/// engine.initialize(TableConfig::local("users"));
/// engine.set_rows("users", vec![Row::new("1").set("name", "Ada")]);
/// assert_eq!(engine.view("users").unwrap().total_rows, 1);
/// ```
pub struct TableEngine {
    config: EngineConfig,
    document: Document,
    listeners: Listeners<Binding>,
    registry: Registry,
    service: Option<Arc<dyn RenderService>>,
    address_bar: Option<Box<dyn AddressBar>>,
    dialog: Option<Box<dyn ConfirmDialog>>,
    drawer: Option<Box<dyn Drawer>>,
    pending_action: Option<actions::PendingAction>,
    drawer_table: Option<TableId>,
    notices: Vec<Notice>,
}

impl TableEngine {
    pub fn builder() -> TableEngineBuilder<Missing> {
        TableEngineBuilder::new()
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize or re-initialize a table.
    ///
    /// A table whose element is missing is left alone. Re-initialization
    /// keeps the table's view and selection, and replaces its listeners
    /// rather than adding to them. Returns whether the table was set up.
    pub fn initialize(&mut self, config: TableConfig) -> bool {
        let id = config.id.clone();
        let anchors = Anchors::new(id.as_str());
        if !self.document.contains(anchors.table()) {
            log::debug!("Table {id} not in document, skipping initialization");
            return false;
        }

        let search_wait = if config.is_remote() {
            self.config.remote_search_debounce
        } else {
            self.config.local_search_debounce
        };
        let default_sort = config.default_sort.clone();
        let (entry, created) =
            self.registry
                .get_or_create(config, self.config.default_page_size, search_wait);
        if created {
            entry.open_panels = projection::read_open_panels(&self.document, &anchors);
        }

        if entry.view.is_remote()
            && entry.take_address_restore()
            && let Some(bar) = &self.address_bar
        {
            restore_address(&mut entry.view, &bar.location());
            entry.filter_draft = FilterDraft::from_filters(&entry.view.filters);
        }
        if let Some(sort) = default_sort
            && entry.take_default_sort()
            && entry.view.sort.is_none()
        {
            entry.view.sort = Some(sort);
        }
        if entry.view.is_remote() {
            if let Some(meta) = self.document.get(&anchors.meta()) {
                PaginationMeta::from_element(meta).apply_to(&mut entry.view);
            }
        } else if entry.rows.is_empty()
            && let Some(rows) = projection::read_rows(&mut self.document, &anchors)
        {
            entry.rows = RowSnapshot::new(rows);
            prune_selection(entry, &mut self.notices);
        }

        self.bind_all(&id);
        self.render(&id);
        log::info!(
            "{} table {id}",
            if created { "Initialized" } else { "Re-initialized" }
        );
        true
    }

    /// Initialize a table from the `data-*` configuration in the document.
    pub fn initialize_from_document(&mut self, id: &str) -> bool {
        match TableConfig::discover(&self.document, id) {
            Some(config) => self.initialize(config),
            None => {
                log::debug!("Table {id} not in document");
                false
            }
        }
    }

    /// Replace a local table's rows and render them.
    ///
    /// Selected IDs no longer present are dropped.
    pub fn set_rows(&mut self, table: &str, rows: Vec<Row>) -> bool {
        let anchors = Anchors::new(table);
        let Some(entry) = self.registry.get_mut(table) else {
            log::warn!("set_rows on unknown table {table}");
            return false;
        };
        if entry.view.is_remote() {
            log::warn!("Ignoring rows for remote table {table}");
            return false;
        }

        let elements = rows
            .iter()
            .map(|row| projection::render_row(&anchors, row, &entry.config, &entry.view.hidden_columns))
            .collect();
        self.document.set_children(&anchors.body(), elements);
        entry.rows = RowSnapshot::new(rows);
        prune_selection(entry, &mut self.notices);
        self.render(&TableId::new(table));
        true
    }

    /// Forget a table and detach its listeners.
    pub fn remove_table(&mut self, table: &str) -> bool {
        let Some(mut entry) = self.registry.remove(table) else {
            return false;
        };
        entry.teardown(&mut self.listeners);
        if self
            .pending_action
            .as_ref()
            .is_some_and(|p| p.table().as_str() == table)
        {
            self.pending_action = None;
        }
        if self.drawer_table.as_ref().is_some_and(|t| t.as_str() == table) {
            self.drawer_table = None;
        }
        log::debug!("Removed table {table}");
        true
    }

    fn bind_all(&mut self, table: &TableId) {
        let Some(entry) = self.registry.get_mut(table.as_str()) else {
            return;
        };
        for facet in Facet::ALL {
            let document = &self.document;
            entry
                .subscriptions_mut(facet)
                .rebind(&mut self.listeners, |listeners| {
                    bind::bind_facet(document, listeners, table, facet)
                });
        }
    }

    /// Project a table's state into the document.
    fn render(&mut self, table: &TableId) {
        let anchors = Anchors::new(table.as_str());
        let Some(entry) = self.registry.get_mut(table.as_str()) else {
            return;
        };
        if !entry.view.is_remote() {
            local::evaluate_and_project(&mut self.document, &self.config, &anchors, entry);
        }
        projection::project_headers(&mut self.document, &anchors, entry.view.sort.as_ref());
        projection::project_columns(&mut self.document, &anchors, &entry.view.hidden_columns);
        projection::project_panels(&mut self.document, &anchors, &entry.open_panels);
        projection::project_filter_panel(
            &mut self.document,
            &anchors,
            &entry.filter_draft,
            &entry.config.columns,
        );
        projection::project_selection(&mut self.document, &anchors, entry);
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Deliver a user event: update the control's form state, then run
    /// every listener it reaches, innermost first.
    pub async fn dispatch(&mut self, event: Event) {
        apply_form_state(&mut self.document, &event);
        let bindings = self.listeners.dispatch(&self.document, &event);
        if bindings.is_empty() {
            log::debug!("No listeners for {:?} on {}", event.kind(), event.target());
        }
        for binding in bindings {
            self.handle(binding, &event).await;
        }
    }

    async fn handle(&mut self, binding: Binding, event: &Event) {
        let table = binding.table.as_str();
        if !self.registry.contains(table) {
            return;
        }
        match binding.action {
            Action::RowCheck => self.on_row_check(table, event),
            Action::SelectAll => self.on_select_all(table, event),
            Action::BulkToolbar => self.on_bulk_toolbar(table, event),
            Action::PrevPage => {
                if !self.is_disabled(event.target()) {
                    self.navigate(table, ViewDelta::PrevPage).await;
                }
            }
            Action::NextPage => {
                if !self.is_disabled(event.target()) {
                    self.navigate(table, ViewDelta::NextPage).await;
                }
            }
            Action::PageButton => {
                let page = self
                    .closest(event.target(), |e| e.data.contains_key("page"))
                    .and_then(|e| e.data_value("page"))
                    .and_then(|p| p.parse::<u32>().ok());
                if let Some(page) = page {
                    self.navigate(table, ViewDelta::GoToPage(page)).await;
                }
            }
            Action::PageSize => {
                let size = self
                    .document
                    .get(event.target())
                    .and_then(|e| e.value().parse::<u32>().ok())
                    .filter(|&s| s > 0);
                if let Some(size) = size {
                    self.navigate(table, ViewDelta::SetPageSize(size)).await;
                }
            }
            Action::Search => {
                if let (Event::Input { value, .. }, Some(entry)) = (event, self.registry.get_mut(table)) {
                    entry.search.push(value.clone(), Instant::now());
                }
            }
            Action::HeaderSort => self.on_header_click(table, event).await,
            Action::FilterAdd => self.on_filter_add(table),
            Action::FilterApply => self.on_filter_apply(table).await,
            Action::FilterClear => self.on_filter_clear(table).await,
            Action::FilterEdit => self.on_filter_edit(table, event),
            Action::RowAction => self.on_row_action(table, event),
            Action::TogglePanel => self.on_toggle_panel(table, event),
            Action::ColumnToggle => self.on_column_toggle(table, event),
        }
    }

    fn is_disabled(&self, id: &str) -> bool {
        self.document.get(id).is_some_and(|e| e.disabled)
    }

    /// The nearest element from `id` up to the root matching `predicate`.
    fn closest(&self, id: &str, predicate: impl Fn(&tabledom::Element) -> bool) -> Option<&tabledom::Element> {
        self.document
            .ancestors(id)?
            .into_iter()
            .filter_map(|(ancestor, _)| self.document.get(&ancestor))
            .find(|&e| predicate(e))
    }

    /// Apply a view change: recompute locally, or request it remotely.
    ///
    /// Returns whether the view was updated.
    pub async fn navigate(&mut self, table: &str, delta: ViewDelta) -> bool {
        let Some(entry) = self.registry.get_mut(table) else {
            return false;
        };
        if entry.view.is_remote() {
            return self.sync(table, &delta).await == SyncOutcome::Applied;
        }
        let changed = entry.view.apply(&delta);
        self.render(&TableId::new(table));
        changed || matches!(delta, ViewDelta::Refresh)
    }

    /// Re-show a table: a full remote refresh, or a local re-render.
    pub async fn refresh(&mut self, table: &str) -> bool {
        self.navigate(table, ViewDelta::Refresh).await
    }

    // =========================================================================
    // Timers and reconciliation
    // =========================================================================

    /// Run debounced searches that are due at `now`. Returns how many ran.
    pub async fn poll_timers(&mut self, now: Instant) -> usize {
        let due: Vec<(TableId, String)> = self
            .registry
            .iter_mut()
            .filter_map(|entry| {
                let term = entry.search.take_due(now)?;
                Some((entry.id().clone(), term))
            })
            .collect();
        let count = due.len();
        for (table, term) in due {
            self.navigate(table.as_str(), ViewDelta::Search(term)).await;
        }
        count
    }

    /// The earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.registry
            .iter()
            .filter_map(|entry| entry.search.deadline())
            .min()
    }

    /// Handle the document's pending "content replaced" notifications:
    /// every affected table re-binds its listeners and re-projects.
    ///
    /// Returns the tables that were re-bound.
    pub fn content_replaced(&mut self) -> Vec<TableId> {
        let replaced = self.document.take_replaced();
        if replaced.is_empty() {
            return Vec::new();
        }
        let affected: Vec<TableId> = self
            .registry
            .ids()
            .into_iter()
            .filter(|id| {
                let anchors = Anchors::new(id.as_str());
                replaced.iter().any(|r| anchors.owns_region(r)) || self.is_stale(id)
            })
            .collect();
        for table in &affected {
            self.rebind_after_replacement(table);
        }
        affected
    }

    /// Swap markup in as the children of `id`, then re-bind whatever it
    /// touched. For hosts that fetch fragments themselves.
    pub fn swap_inner_markup(&mut self, id: &str, markup: &str) -> Result<Vec<TableId>, Error> {
        self.document.replace_inner_markup(id, markup)?;
        Ok(self.content_replaced())
    }

    /// A timer for the fallback poll, at the configured interval. Call
    /// [`TableEngine::reconcile`] on every tick.
    pub fn reconcile_timer(&self) -> ReconcileTimer {
        ReconcileTimer::new(self.config.reconcile_interval)
    }

    /// Fallback poll: handle unreported replacements by re-binding any
    /// table whose listeners went stale, and restore panel and column
    /// state a replacement may have reset. Returns how many were re-bound.
    pub fn reconcile(&mut self) -> usize {
        let mut rebound = self.content_replaced().len();
        for table in self.registry.ids() {
            if self.is_stale(&table) {
                self.rebind_after_replacement(&table);
                rebound += 1;
            }
            let anchors = Anchors::new(table.as_str());
            if let Some(entry) = self.registry.get(table.as_str()) {
                projection::project_panels(&mut self.document, &anchors, &entry.open_panels);
                projection::project_columns(&mut self.document, &anchors, &entry.view.hidden_columns);
            }
        }
        let pruned = self.listeners.prune(&self.document);
        if rebound > 0 || pruned > 0 {
            log::debug!("Reconciled {rebound} tables, pruned {pruned} listeners");
        }
        rebound
    }

    fn is_stale(&self, table: &TableId) -> bool {
        let Some(entry) = self.registry.get(table.as_str()) else {
            return false;
        };
        Facet::ALL.iter().any(|facet| {
            entry
                .subscriptions(*facet)
                .is_some_and(|set| set.is_stale(&self.listeners, &self.document))
        })
    }

    fn rebind_after_replacement(&mut self, table: &TableId) {
        let anchors = Anchors::new(table.as_str());
        if !self.document.contains(anchors.table()) {
            if let Some(entry) = self.registry.get_mut(table.as_str()) {
                entry.teardown(&mut self.listeners);
            }
            log::debug!("Table {table} left the document");
            return;
        }
        if let Some(entry) = self.registry.get_mut(table.as_str())
            && !entry.view.is_remote()
        {
            match projection::read_rows(&mut self.document, &anchors) {
                Some(rows) => {
                    entry.rows = RowSnapshot::new(rows);
                    prune_selection(entry, &mut self.notices);
                }
                None if !entry.rows.is_empty() => {
                    let elements = entry
                        .rows
                        .rows()
                        .iter()
                        .map(|row| projection::render_row(&anchors, row, &entry.config, &entry.view.hidden_columns))
                        .collect();
                    self.document.set_children(&anchors.body(), elements);
                }
                None => {}
            }
        }
        self.bind_all(table);
        self.render(table);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable document access, for hosts that swap content in directly.
    /// Call [`TableEngine::content_replaced`] afterwards.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn view(&self, table: &str) -> Option<&TableView> {
        self.registry.get(table).map(|e| &e.view)
    }

    pub fn entry(&self, table: &str) -> Option<&TableEntry> {
        self.registry.get(table)
    }

    pub fn tables(&self) -> Vec<TableId> {
        self.registry.ids()
    }

    /// The filter draft behind a table's panel, for programmatic editing.
    /// Changes show up on the next render.
    pub fn filter_draft_mut(&mut self, table: &str) -> Option<&mut FilterDraft> {
        self.registry.get_mut(table).map(|e| &mut e.filter_draft)
    }

    /// Show or hide a column of a table.
    pub fn set_column_visible(&mut self, table: &str, column: &str, visible: bool) -> bool {
        let anchors = Anchors::new(table);
        let Some(entry) = self.registry.get_mut(table) else {
            return false;
        };
        if !entry.view.set_column_visible(column, visible) {
            return false;
        }
        log::debug!("Column {column} of {table} {}", if visible { "shown" } else { "hidden" });
        projection::project_columns(&mut self.document, &anchors, &entry.view.hidden_columns);
        true
    }

    /// Selected row IDs of a table, sorted.
    pub fn selected(&self, table: &str) -> Vec<String> {
        self.registry
            .get(table)
            .map(|e| e.view.selection.sorted())
            .unwrap_or_default()
    }

    /// Listeners currently attached across all tables.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The current address, if an address bar is attached.
    pub fn location(&self) -> Option<Url> {
        self.address_bar.as_ref().map(|bar| bar.location())
    }
}

/// Drop selected IDs that no longer have a row, with a notice if any went.
fn prune_selection(entry: &mut TableEntry, notices: &mut Vec<Notice>) {
    let stale: Vec<String> = entry
        .view
        .selection
        .iter()
        .filter(|id| !entry.rows.contains(id))
        .map(str::to_string)
        .collect();
    if entry.view.selection.deselect_all(stale.iter().map(String::as_str)) {
        log::debug!("Dropped {} stale selections from {}", stale.len(), entry.id());
        notices.push(Notice::SelectionChanged {
            table: entry.id().clone(),
            count: entry.view.selection.len(),
        });
    }
}

/// Seed a view from address parameters, without resetting anything else.
fn restore_address(view: &mut TableView, location: &Url) {
    let state = crate::history::restore(location);
    if state.is_empty() {
        return;
    }
    log::debug!("Restoring {} from address {location}", view.id);
    if let Some(size) = state.size {
        view.page_size = size;
    }
    if let Some(search) = state.search {
        view.search = search;
    }
    if state.sort.is_some() {
        view.sort = state.sort;
    }
    if !state.filters.is_empty() {
        view.filters = state.filters;
    }
    if let (Some(page), Pagination::Offset { page: current }) = (state.page, &mut view.pagination) {
        *current = page;
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for a missing required builder field.
pub struct Missing;

/// Marker type for a set builder field.
pub struct Set<T>(T);

/// Builder for [`TableEngine`]. The document is required.
///
/// ```ignore
/// let engine = TableEngine::builder()
///     .document(document)
///     .service(HttpRenderService::new())
///     .address_bar(MemoryAddressBar::parse("https://app.test/users")?)
///     .build();
/// ```
pub struct TableEngineBuilder<Doc> {
    document: Doc,
    config: EngineConfig,
    service: Option<Arc<dyn RenderService>>,
    address_bar: Option<Box<dyn AddressBar>>,
    dialog: Option<Box<dyn ConfirmDialog>>,
    drawer: Option<Box<dyn Drawer>>,
}

impl TableEngineBuilder<Missing> {
    pub fn new() -> Self {
        Self {
            document: Missing,
            config: EngineConfig::default(),
            service: None,
            address_bar: None,
            dialog: None,
            drawer: None,
        }
    }

    pub fn document(self, document: Document) -> TableEngineBuilder<Set<Document>> {
        TableEngineBuilder {
            document: Set(document),
            config: self.config,
            service: self.service,
            address_bar: self.address_bar,
            dialog: self.dialog,
            drawer: self.drawer,
        }
    }
}

impl Default for TableEngineBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> TableEngineBuilder<D> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Renders remote tables and receives action POSTs.
    pub fn service<S: RenderService + 'static>(mut self, service: S) -> Self {
        self.service = Some(Arc::new(service));
        self
    }

    pub fn shared_service(mut self, service: Arc<dyn RenderService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn address_bar<A: AddressBar + 'static>(mut self, address_bar: A) -> Self {
        self.address_bar = Some(Box::new(address_bar));
        self
    }

    pub fn dialog<C: ConfirmDialog + 'static>(mut self, dialog: C) -> Self {
        self.dialog = Some(Box::new(dialog));
        self
    }

    pub fn drawer<R: Drawer + 'static>(mut self, drawer: R) -> Self {
        self.drawer = Some(Box::new(drawer));
        self
    }
}

impl TableEngineBuilder<Set<Document>> {
    pub fn build(self) -> TableEngine {
        TableEngine {
            config: self.config,
            document: self.document.0,
            listeners: Listeners::new(),
            registry: Registry::new(),
            service: self.service,
            address_bar: self.address_bar,
            dialog: self.dialog,
            drawer: self.drawer,
            pending_action: None,
            drawer_table: None,
            notices: Vec::new(),
        }
    }
}

//! Per-table state, keyed by table ID.
//!
//! One [`Registry`] owns every table's state. Entries are created on first
//! initialization and kept across re-initialization, so a table that is
//! re-rendered keeps its page, page size and selection.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::time::Duration;

use tabledom::Listeners;

use crate::config::TableConfig;
use crate::debounce::Debouncer;
use crate::model::RowSnapshot;
use crate::model::TableId;
use crate::model::TableView;
use crate::query::FilterDraft;
use crate::remote::SyncSequence;
use crate::selection::SubscriptionSet;

/// A group of listeners bound and torn down together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Row checkboxes, select-all and the bulk toolbar.
    Selection,
    /// Prev/next, page buttons and the page-size selector.
    Pagination,
    /// Search, sortable headers and the filter panel.
    Toolbar,
    /// Per-row action buttons.
    RowActions,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::Selection,
        Facet::Pagination,
        Facet::Toolbar,
        Facet::RowActions,
    ];
}

/// Everything kept for one table.
#[derive(Debug, Clone)]
pub struct TableEntry {
    pub config: TableConfig,
    pub view: TableView,
    /// Local rows; empty for remote tables.
    pub rows: RowSnapshot,
    pub sync: SyncSequence,
    pub filter_draft: FilterDraft,
    pub search: Debouncer<String>,
    /// IDs of the table's toggled panels that are open.
    pub open_panels: BTreeSet<String>,
    subscriptions: HashMap<Facet, SubscriptionSet>,
    default_sort_applied: bool,
    address_restored: bool,
}

impl TableEntry {
    fn new(config: TableConfig, default_page_size: u32, search_wait: Duration) -> Self {
        Self {
            view: TableView::new(&config, default_page_size),
            config,
            rows: RowSnapshot::default(),
            sync: SyncSequence::new(),
            filter_draft: FilterDraft::new(),
            search: Debouncer::new(search_wait),
            open_panels: BTreeSet::new(),
            subscriptions: HashMap::new(),
            default_sort_applied: false,
            address_restored: false,
        }
    }

    pub fn id(&self) -> &TableId {
        &self.config.id
    }

    pub fn subscriptions(&self, facet: Facet) -> Option<&SubscriptionSet> {
        self.subscriptions.get(&facet)
    }

    pub fn subscriptions_mut(&mut self, facet: Facet) -> &mut SubscriptionSet {
        self.subscriptions.entry(facet).or_default()
    }

    /// Total live subscriptions across facets.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.values().map(SubscriptionSet::len).sum()
    }

    /// Detach every facet's listeners.
    pub fn teardown<H: Clone>(&mut self, listeners: &mut Listeners<H>) -> usize {
        self.subscriptions
            .values_mut()
            .map(|set| set.teardown(listeners))
            .sum()
    }

    /// Mark the default sort applied. Returns `true` the first time only.
    pub fn take_default_sort(&mut self) -> bool {
        !std::mem::replace(&mut self.default_sort_applied, true)
    }

    /// Mark the address restored. Returns `true` the first time only.
    pub fn take_address_restore(&mut self) -> bool {
        !std::mem::replace(&mut self.address_restored, true)
    }
}

/// Owned collection of [`TableEntry`] values.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tables: BTreeMap<TableId, TableEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry for `config.id`, created on first use.
    ///
    /// An existing entry keeps its view; only its configuration is
    /// replaced. Returns the entry and whether it was created.
    pub fn get_or_create(
        &mut self,
        config: TableConfig,
        default_page_size: u32,
        search_wait: Duration,
    ) -> (&mut TableEntry, bool) {
        let id = config.id.clone();
        let created = !self.tables.contains_key(&id);
        let entry = self
            .tables
            .entry(id)
            .and_modify(|entry| {
                entry.view.mode = config.mode.clone();
                entry.search.set_wait(search_wait);
            })
            .or_insert_with(|| {
                log::debug!("Registered table {}", config.id);
                TableEntry::new(config.clone(), default_page_size, search_wait)
            });
        entry.config = config;
        (entry, created)
    }

    pub fn get(&self, id: &str) -> Option<&TableEntry> {
        self.tables.get(&TableId::new(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TableEntry> {
        self.tables.get_mut(&TableId::new(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: &str) -> Option<TableEntry> {
        self.tables.remove(&TableId::new(id))
    }

    pub fn ids(&self) -> Vec<TableId> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.tables.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TableEntry> {
        self.tables.values_mut()
    }
}

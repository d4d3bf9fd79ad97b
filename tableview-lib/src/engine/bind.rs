//! Listener bindings per table facet.

use tabledom::Document;
use tabledom::EventKind;
use tabledom::ListenerId;
use tabledom::Listeners;

use crate::anchors::Anchors;
use crate::model::TableId;
use crate::registry::Facet;

/// What a listener does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Delegated on the table: a row checkbox changed.
    RowCheck,
    SelectAll,
    /// Delegated on the bulk toolbar: select-all, cancel or an action button.
    BulkToolbar,
    PrevPage,
    NextPage,
    /// Delegated on the page-button strip.
    PageButton,
    PageSize,
    Search,
    /// Delegated on the table: a sortable header was clicked.
    HeaderSort,
    FilterAdd,
    FilterApply,
    FilterClear,
    /// Delegated on the filter panel: a draft row was edited or removed.
    FilterEdit,
    /// Delegated on the table: a row action button was clicked.
    RowAction,
    /// Delegated on the card: a `data-toggle` control was clicked.
    TogglePanel,
    /// Delegated on the columns menu: a column checkbox changed.
    ColumnToggle,
}

/// A listener's payload: the table it belongs to and what it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub table: TableId,
    pub action: Action,
}

/// Attach the listeners of one facet. Missing anchors are skipped.
pub(super) fn bind_facet(
    document: &Document,
    listeners: &mut Listeners<Binding>,
    table: &TableId,
    facet: Facet,
) -> Vec<ListenerId> {
    let anchors = Anchors::new(table.as_str());
    let wanted: Vec<(String, EventKind, Action)> = match facet {
        Facet::Selection => vec![
            (anchors.table().to_string(), EventKind::Change, Action::RowCheck),
            (anchors.select_all(), EventKind::Change, Action::SelectAll),
            (anchors.bulk(), EventKind::Click, Action::BulkToolbar),
        ],
        Facet::Pagination => vec![
            (anchors.prev(), EventKind::Click, Action::PrevPage),
            (anchors.next(), EventKind::Click, Action::NextPage),
            (anchors.pages(), EventKind::Click, Action::PageButton),
            (anchors.page_size(), EventKind::Change, Action::PageSize),
        ],
        Facet::Toolbar => vec![
            (anchors.search(), EventKind::Input, Action::Search),
            (anchors.table().to_string(), EventKind::Click, Action::HeaderSort),
            (anchors.filter_add(), EventKind::Click, Action::FilterAdd),
            (anchors.filter_apply(), EventKind::Click, Action::FilterApply),
            (anchors.filter_clear(), EventKind::Click, Action::FilterClear),
            (anchors.filters(), EventKind::Change, Action::FilterEdit),
            (anchors.filters(), EventKind::Input, Action::FilterEdit),
            (anchors.filters(), EventKind::Click, Action::FilterEdit),
            (anchors.card(), EventKind::Click, Action::TogglePanel),
            (anchors.columns(), EventKind::Change, Action::ColumnToggle),
        ],
        Facet::RowActions => vec![(anchors.table().to_string(), EventKind::Click, Action::RowAction)],
    };

    let bound: Vec<ListenerId> = wanted
        .into_iter()
        .filter_map(|(target, kind, action)| {
            let binding = Binding {
                table: table.clone(),
                action,
            };
            listeners.attach(document, &target, kind, binding)
        })
        .collect();
    log::debug!("Bound {} {facet:?} listeners for {table}", bound.len());
    bound
}

#[cfg(test)]
mod tests {
    use tabledom::Event;

    use super::*;

    #[test]
    fn test_missing_anchors_skipped() {
        let doc = Document::parse(
            r#"<div id="t-card"><table id="t"/><button id="t-next">Next</button></div>"#,
        )
        .unwrap();
        let mut listeners = Listeners::new();
        let table = TableId::new("t");

        assert_eq!(bind_facet(&doc, &mut listeners, &table, Facet::Pagination).len(), 1);
        assert_eq!(bind_facet(&doc, &mut listeners, &table, Facet::Selection).len(), 1);

        let fired = listeners.dispatch(&doc, &Event::click("t-next"));
        assert_eq!(
            fired,
            vec![Binding {
                table,
                action: Action::NextPage
            }]
        );
    }
}

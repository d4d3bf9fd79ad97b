//! Bulk and row actions: confirmation, POST and refresh.

use std::sync::Arc;

use tabledom::Event;
use url::Url;

use super::Notice;
use super::TableEngine;
use super::projection::DomRows;
use crate::actions::ROW_ACTION_CLASS;
use crate::actions::RowActionRequest;
use crate::actions::bulk_confirm_request;
use crate::actions::bulk_form;
use crate::anchors::Anchors;
use crate::collab::ConfirmOutcome;
use crate::collab::SubmitResult;
use crate::config::BulkActionConfig;
use crate::error::SyncError;
use crate::model::TableId;
use crate::remote::RenderService;
use crate::selection::action_enabled;

/// An action waiting on the confirmation dialog.
#[derive(Debug, Clone)]
pub(super) enum PendingAction {
    Bulk {
        table: TableId,
        action: BulkActionConfig,
        ids: Vec<String>,
    },
    Row {
        table: TableId,
        request: RowActionRequest,
    },
}

impl PendingAction {
    pub(super) fn table(&self) -> &TableId {
        match self {
            PendingAction::Bulk { table, .. } | PendingAction::Row { table, .. } => table,
        }
    }

    /// POST target and form fields.
    fn request(&self) -> Option<(String, Vec<(String, String)>)> {
        match self {
            PendingAction::Bulk { action, ids, .. } => {
                let endpoint = action.endpoint.clone()?;
                Some((endpoint, bulk_form(ids, action.extra_params.as_deref())))
            }
            PendingAction::Row { request, .. } => Some((request.url.clone(), Vec::new())),
        }
    }

    fn describe(&self) -> String {
        match self {
            PendingAction::Bulk { action, ids, .. } => format!("{} on {} rows", action.key, ids.len()),
            PendingAction::Row { request, .. } => {
                format!("{} of row {}", request.kind.as_str(), request.row_id)
            }
        }
    }
}

impl TableEngine {
    // =========================================================================
    // Bulk toolbar
    // =========================================================================

    pub(super) fn on_bulk_toolbar(&mut self, table: &str, event: &Event) {
        let anchors = Anchors::new(table);
        let select_all = anchors.bulk_select_all();
        let cancel = anchors.bulk_cancel();
        let hit = self
            .closest(event.target(), |e| {
                e.id == select_all || e.id == cancel || e.data.contains_key("bulk-action")
            })
            .map(|e| {
                (
                    e.id.clone(),
                    e.data_value("bulk-action").map(str::to_string),
                    e.disabled,
                )
            });
        let Some((id, key, disabled)) = hit else {
            return;
        };

        if id == select_all {
            self.update_selection(table, |selection, checkable| {
                selection.select_all(checkable.iter().map(String::as_str))
            });
        } else if id == cancel {
            self.update_selection(table, |selection, _| selection.clear());
        } else if let Some(key) = key {
            if disabled {
                log::debug!("Bulk action {key} on {table} is disabled");
                return;
            }
            self.start_bulk_action(table, &key);
        }
    }

    /// Run a configured bulk action against the current selection.
    ///
    /// Actions without an endpoint are handed to the host as a
    /// [`Notice::BulkAction`]; the others are confirmed first.
    pub fn start_bulk_action(&mut self, table: &str, key: &str) -> bool {
        let anchors = Anchors::new(table);
        let Some(entry) = self.registry.get(table) else {
            return false;
        };
        let Some(action) = entry.config.bulk_action(key).cloned() else {
            log::warn!("Unknown bulk action {key} on {table}");
            return false;
        };
        let rows = DomRows {
            document: &self.document,
            anchors: &anchors,
        };
        if !action_enabled(&action, &entry.view.selection, &rows) {
            log::debug!("Bulk action {key} not enabled for the selection of {table}");
            return false;
        }
        let ids = entry.view.selection.sorted();

        if action.endpoint.is_none() {
            log::info!("Bulk action {key} on {} rows of {table}", ids.len());
            self.notices.push(Notice::BulkAction {
                table: TableId::new(table),
                action: key.to_string(),
                ids,
            });
            return true;
        }
        let Some(dialog) = self.dialog.as_mut() else {
            log::warn!("No confirmation dialog, skipping bulk action {key} on {table}");
            return false;
        };
        dialog.open(bulk_confirm_request(&action, ids.len()));
        self.pending_action = Some(PendingAction::Bulk {
            table: TableId::new(table),
            action,
            ids,
        });
        true
    }

    // =========================================================================
    // Row actions
    // =========================================================================

    pub(super) fn on_row_action(&mut self, table: &str, event: &Event) {
        let request = self
            .closest(event.target(), |e| e.has_class(ROW_ACTION_CLASS))
            .and_then(RowActionRequest::from_element);
        let Some(request) = request else {
            return;
        };

        if request.needs_confirmation() {
            let Some(dialog) = self.dialog.as_mut() else {
                log::warn!(
                    "No confirmation dialog, skipping {} on {table}",
                    request.kind.as_str()
                );
                return;
            };
            dialog.open(request.confirm_request());
            self.pending_action = Some(PendingAction::Row {
                table: TableId::new(table),
                request,
            });
            return;
        }

        let url = match self.resolve_url(&request.url) {
            Ok(url) => url,
            Err(e) => {
                log::error!("Cannot open {}: {e}", request.url);
                return;
            }
        };
        let Some(drawer) = self.drawer.as_mut() else {
            log::warn!("No drawer, skipping edit of row {} on {table}", request.row_id);
            return;
        };
        drawer.open(&request.title, &url);
        self.drawer_table = Some(TableId::new(table));
    }

    // =========================================================================
    // Collaborator results
    // =========================================================================

    /// Whether an action is waiting for the confirmation dialog.
    pub fn awaiting_confirmation(&self) -> bool {
        self.pending_action.is_some()
    }

    /// Report what the confirmation dialog did.
    ///
    /// A plain confirmation makes the engine POST the action; an outcome
    /// carrying a URL means the dialog already sent it. On success the
    /// dialog closes and the table refreshes; a bulk action also clears
    /// the selection.
    pub async fn confirm_outcome(&mut self, outcome: ConfirmOutcome) {
        let Some(pending) = self.pending_action.take() else {
            log::debug!("Confirmation outcome with no pending action");
            return;
        };

        match (outcome.success, outcome.url) {
            (false, None) => {
                log::debug!("Cancelled {}", pending.describe());
                self.close_dialog();
            }
            (true, None) => {
                let result = match pending.request() {
                    Some((path, form)) => match self.post_target(&path) {
                        Ok((service, url)) => service.post_form(&url, &form).await,
                        Err(e) => Err(e),
                    },
                    None => Err(SyncError::malformed("action has no endpoint")),
                };
                match result {
                    Ok(_) => self.action_succeeded(pending).await,
                    Err(e) => {
                        log::error!("{} failed: {e}", pending.describe());
                        self.close_dialog();
                    }
                }
            }
            (true, Some(url)) => {
                log::debug!("Dialog completed {} via {url}", pending.describe());
                self.action_succeeded(pending).await;
            }
            (false, Some(url)) => {
                log::error!("{} failed at {url}", pending.describe());
                self.close_dialog();
            }
        }
    }

    /// Report the drawer's form submission. Success closes the drawer
    /// and refreshes the table that opened it.
    pub async fn drawer_submitted(&mut self, result: SubmitResult) {
        if !result.success {
            let message = result
                .message
                .unwrap_or_else(|| "An error occurred while saving".to_string());
            log::warn!("Drawer submission failed: {message}");
            if let Some(drawer) = self.drawer.as_mut() {
                drawer.show_error(&message);
            }
            return;
        }
        if let Some(drawer) = self.drawer.as_mut() {
            drawer.close();
        }
        if let Some(table) = self.drawer_table.take() {
            self.refresh(table.as_str()).await;
        }
    }

    async fn action_succeeded(&mut self, pending: PendingAction) {
        self.close_dialog();
        let table = pending.table().clone();
        if let PendingAction::Bulk { .. } = pending {
            self.update_selection(table.as_str(), |selection, _| selection.clear());
        }
        log::info!("Completed {} on {table}", pending.describe());
        self.refresh(table.as_str()).await;
    }

    fn close_dialog(&mut self) {
        if let Some(dialog) = self.dialog.as_mut() {
            dialog.close();
        }
    }

    fn post_target(&self, path: &str) -> Result<(Arc<dyn RenderService>, Url), SyncError> {
        let service = self.service.clone().ok_or(SyncError::NoService)?;
        Ok((service, self.resolve_url(path)?))
    }

    /// `path` resolved against the current address, or parsed as an
    /// absolute URL when there is no address bar.
    fn resolve_url(&self, path: &str) -> Result<Url, SyncError> {
        match self.location() {
            Some(location) => Ok(location.join(path)?),
            None => Ok(Url::parse(path)?),
        }
    }
}

//! Remote-mode synchronization: request, sequence, apply.

use tabledom::element::find_element;
use url::Url;

use super::TableEngine;
use crate::anchors::Anchors;
use crate::error::SyncError;
use crate::history::address_for;
use crate::model::Pagination;
use crate::model::TableId;
use crate::model::TableView;
use crate::model::ViewDelta;
use crate::remote::FetchedSync;
use crate::remote::PageRequest;
use crate::remote::PaginationMeta;
use crate::remote::PendingSync;
use crate::remote::RenderResponse;
use crate::remote::RequestParams;
use crate::remote::SyncTarget;
use crate::remote::TargetedPatch;

/// How a remote sync ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The response was applied to the document and view.
    Applied,
    /// A newer response had already been applied; this one was dropped.
    Stale,
    /// The request failed; the view is unchanged.
    Failed,
    /// Nothing was requested.
    Skipped,
}

impl TableEngine {
    /// Request the view after `delta` and apply the response.
    pub(super) async fn sync(&mut self, table: &str, delta: &ViewDelta) -> SyncOutcome {
        let Some(service) = self.service.clone() else {
            log::warn!("No render service for remote table {table}");
            return SyncOutcome::Skipped;
        };
        let pending = match self.begin_sync(table, delta) {
            Ok(Some(pending)) => pending,
            Ok(None) => return SyncOutcome::Skipped,
            Err(e) => {
                log::error!("Cannot sync {table}: {e}");
                return SyncOutcome::Failed;
            }
        };

        let fetched = pending.fetch(service.as_ref()).await;
        let retry = match (&fetched.result, &fetched.pending.target) {
            (Ok(RenderResponse::Patch(patch)), SyncTarget::Targeted { full, .. })
                if !self.patch_fits(&fetched.pending.table, patch) =>
            {
                Some(full.clone())
            }
            _ => None,
        };
        let fetched = match retry {
            Some(full) => {
                log::warn!(
                    "Patch regions of {table} missing from the document, requesting full card"
                );
                let pending = PendingSync {
                    target: SyncTarget::Full(full),
                    ..fetched.pending
                };
                let mut refetched = pending.fetch(service.as_ref()).await;
                refetched.fell_back = true;
                refetched
            }
            None => fetched,
        };
        self.complete_sync(fetched)
    }

    /// Issue a request number and mirror the requested view into the
    /// address. Returns `None` when the delta needs no request.
    ///
    /// Together with [`PendingSync::fetch`] and [`TableEngine::complete_sync`]
    /// this lets a host run several requests at once; responses that lose
    /// the race are discarded.
    pub fn begin_sync(
        &mut self,
        table: &str,
        delta: &ViewDelta,
    ) -> Result<Option<PendingSync>, SyncError> {
        let location = self.location();
        let default_size = self.config.default_page_size;
        let Some(entry) = self.registry.get_mut(table) else {
            return Ok(None);
        };
        let Some(endpoints) = entry.config.endpoints().cloned() else {
            return Ok(None);
        };
        let Some(params) = RequestParams::for_delta(&entry.view, delta) else {
            log::debug!("{delta:?} not possible for {table}");
            return Ok(None);
        };

        let base = match location {
            Some(location) => location,
            None => Url::parse(&endpoints.pagination_url)?,
        };
        let refresh = matches!(delta, ViewDelta::Refresh);
        let target = SyncTarget::resolve(&base, &endpoints, &params, default_size, refresh)?;
        if matches!(delta, ViewDelta::Filters(_) | ViewDelta::ClearFilters) {
            entry.rows.clear_filter_cache();
        }
        let seq = entry.sync.issue();

        if let Some(bar) = &mut self.address_bar {
            let current = bar.location();
            let next = address_for(&current, &params, default_size);
            if next != current {
                log::debug!("Address for {table}: {next}");
                bar.replace(next);
            }
        }

        log::debug!("Sync #{seq} for {table}: {target:?}");
        Ok(Some(PendingSync {
            table: entry.id().clone(),
            seq,
            params,
            target,
        }))
    }

    /// Apply a fetched response unless a newer one has been applied.
    pub fn complete_sync(&mut self, fetched: FetchedSync) -> SyncOutcome {
        let FetchedSync {
            pending,
            result,
            fell_back,
        } = fetched;
        let table = pending.table.clone();
        let anchors = Anchors::new(table.as_str());

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_network() => {
                log::error!("Sync #{} for {table} could not reach the server: {e}", pending.seq);
                return SyncOutcome::Failed;
            }
            Err(e) => {
                log::error!("Sync #{} for {table} failed: {e}", pending.seq);
                return SyncOutcome::Failed;
            }
        };
        let Some(entry) = self.registry.get_mut(table.as_str()) else {
            return SyncOutcome::Skipped;
        };
        if !entry.sync.try_apply(pending.seq) {
            log::warn!(
                "Discarding stale response #{} for {table} (#{} already applied)",
                pending.seq,
                entry.sync.last_applied()
            );
            return SyncOutcome::Stale;
        }

        let patched = response.is_patch();
        let meta = match response {
            RenderResponse::Patch(patch) => {
                if let Some(body) = patch.body
                    && let Err(e) = self.document.replace_children(&anchors.body(), body)
                {
                    log::warn!("Cannot patch {}: {e}", anchors.body());
                }
                if let Some(footer) = patch.footer
                    && let Err(e) = self.document.replace_element(&anchors.footer(), footer)
                {
                    log::warn!("Cannot patch {}: {e}", anchors.footer());
                }
                patch.meta
            }
            RenderResponse::Full(card) => {
                let meta = find_element(&card, &anchors.meta())
                    .map(PaginationMeta::from_element)
                    .unwrap_or_default();
                if let Err(e) = self.document.replace_element(&anchors.card(), card) {
                    log::warn!("Cannot replace {}: {e}", anchors.card());
                }
                meta
            }
        };
        adopt(&mut entry.view, &pending.params);
        meta.apply_to(&mut entry.view);
        // Re-initialization reads the carrier, so it must match the view.
        let carrier = PaginationMeta::from_view(&entry.view);
        self.document
            .with_element(&anchors.meta(), |element| carrier.write_to(element));

        let rebound = self.content_replaced();
        if !rebound.contains(&table) {
            self.bind_all(&table);
            self.render(&table);
        }
        log::info!(
            "Applied #{} to {table} ({}{})",
            pending.seq,
            if patched { "patch" } else { "full card" },
            if fell_back { ", after fallback" } else { "" }
        );
        SyncOutcome::Applied
    }

    /// Whether every region a targeted patch would replace is present.
    fn patch_fits(&self, table: &TableId, patch: &TargetedPatch) -> bool {
        let anchors = Anchors::new(table.as_str());
        (patch.body.is_none() || self.document.contains(&anchors.body()))
            && (patch.footer.is_none() || self.document.contains(&anchors.footer()))
    }
}

/// Take the requested view as current; server metadata refines it after.
fn adopt(view: &mut TableView, params: &RequestParams) {
    view.page_size = params.size;
    view.search = params.search.clone();
    view.sort = params.sort.clone();
    view.filters = params.filters.clone();
    if let (PageRequest::Offset { page }, Pagination::Offset { page: current }) =
        (&params.position, &mut view.pagination)
    {
        *current = *page;
    }
}

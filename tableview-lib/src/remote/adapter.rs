//! Request sequencing and fetching for server-rendered tables.

use url::Url;

use super::RenderResponse;
use super::RenderService;
use super::RequestParams;
use super::parse_card;
use super::parse_response;
use crate::anchors::Anchors;
use crate::config::RemoteEndpoints;
use crate::error::SyncError;
use crate::model::TableId;

/// Monotonic request counter for one table.
///
/// Only a response newer than the last applied one may be applied, so a
/// slow response can never overwrite a fresher view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSequence {
    issued: u64,
    applied: u64,
}

impl SyncSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next request number.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Mark `seq` applied if it is newer than anything applied so far.
    pub fn try_apply(&mut self, seq: u64) -> bool {
        if seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    pub fn last_issued(&self) -> u64 {
        self.issued
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }

    /// Whether a request newer than the last applied one is outstanding.
    pub fn in_flight(&self) -> bool {
        self.issued > self.applied
    }
}

/// What a pending sync will ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncTarget {
    /// Body, footer and metadata from the body endpoint, falling back to
    /// the full card on failure.
    Targeted { body: Url, full: Url },
    /// The full card.
    Full(Url),
}

impl SyncTarget {
    /// Pick endpoints for `params`, resolved against `location`.
    pub fn resolve(
        location: &Url,
        endpoints: &RemoteEndpoints,
        params: &RequestParams,
        default_size: u32,
        refresh: bool,
    ) -> Result<Self, SyncError> {
        let full_path = match (&endpoints.refresh_url, refresh) {
            (Some(refresh_url), true) => refresh_url,
            _ => &endpoints.pagination_url,
        };
        let full = params.apply_to(&location.join(full_path)?, default_size);
        if refresh && endpoints.refresh_url.is_some() {
            return Ok(SyncTarget::Full(full));
        }
        match &endpoints.body_url {
            Some(body_path) => Ok(SyncTarget::Targeted {
                body: params.apply_to(&location.join(body_path)?, default_size),
                full,
            }),
            None => Ok(SyncTarget::Full(full)),
        }
    }
}

/// A sync that has been issued but not yet applied.
#[derive(Debug, Clone)]
pub struct PendingSync {
    pub table: TableId,
    pub seq: u64,
    pub params: RequestParams,
    pub target: SyncTarget,
}

/// The fetched and parsed result of a [`PendingSync`].
#[derive(Debug)]
pub struct FetchedSync {
    pub pending: PendingSync,
    pub result: Result<RenderResponse, SyncError>,
    /// Whether the targeted request failed and the full card was used.
    pub fell_back: bool,
}

impl PendingSync {
    /// Perform the request(s) for this sync.
    ///
    /// A targeted request that fails, or answers with markup that is
    /// neither a patch nor a card, is retried once as a full-card request.
    pub async fn fetch(self, service: &dyn RenderService) -> FetchedSync {
        let anchors = Anchors::new(self.table.as_str());
        match &self.target {
            SyncTarget::Full(url) => {
                let result = fetch_card(service, &anchors, url).await;
                FetchedSync {
                    pending: self,
                    result,
                    fell_back: false,
                }
            }
            SyncTarget::Targeted { body, full } => {
                let targeted = match service.fetch(body).await {
                    Ok(markup) => parse_response(&anchors, &markup),
                    Err(e) => Err(e),
                };
                match targeted {
                    Ok(response) => FetchedSync {
                        pending: self,
                        result: Ok(response),
                        fell_back: false,
                    },
                    Err(e) => {
                        log::warn!(
                            "Targeted update for {} failed ({e}), requesting full card",
                            self.table
                        );
                        let full = full.clone();
                        let result = fetch_card(service, &anchors, &full).await;
                        FetchedSync {
                            pending: self,
                            result,
                            fell_back: true,
                        }
                    }
                }
            }
        }
    }
}

async fn fetch_card(
    service: &dyn RenderService,
    anchors: &Anchors,
    url: &Url,
) -> Result<RenderResponse, SyncError> {
    let markup = service.fetch(url).await?;
    parse_card(anchors, &markup).map(RenderResponse::Full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::model::TableView;
    use crate::remote::StaticRenderService;

    #[test]
    fn test_sequence_rejects_stale() {
        let mut seq = SyncSequence::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.in_flight());
        assert!(seq.try_apply(second));
        assert!(!seq.try_apply(first));
        assert!(!seq.try_apply(second));
        assert_eq!(seq.last_applied(), 2);
        assert!(!seq.in_flight());
    }

    fn params() -> RequestParams {
        let config = TableConfig::remote("users", RemoteEndpoints::new("/users/card"));
        RequestParams::from_view(&TableView::new(&config, 25))
    }

    #[test]
    fn test_resolve_targets() {
        let location = Url::parse("https://app.test/admin/users?tab=all").unwrap();
        let endpoints = RemoteEndpoints::new("/users/card")
            .with_body_url("/users/body")
            .with_refresh_url("/users/refresh");

        let target = SyncTarget::resolve(&location, &endpoints, &params(), 25, false).unwrap();
        assert_eq!(
            target,
            SyncTarget::Targeted {
                body: Url::parse("https://app.test/users/body").unwrap(),
                full: Url::parse("https://app.test/users/card").unwrap(),
            }
        );

        let refresh = SyncTarget::resolve(&location, &endpoints, &params(), 25, true).unwrap();
        assert_eq!(
            refresh,
            SyncTarget::Full(Url::parse("https://app.test/users/refresh").unwrap())
        );
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_card() {
        let service = StaticRenderService::new()
            .fail("/users/body", 500)
            .route("/users/card", r#"<div id="users-card"><table id="users"/></div>"#);
        let pending = PendingSync {
            table: TableId::new("users"),
            seq: 1,
            params: params(),
            target: SyncTarget::Targeted {
                body: Url::parse("https://app.test/users/body").unwrap(),
                full: Url::parse("https://app.test/users/card").unwrap(),
            },
        };

        let fetched = pending.fetch(&service).await;
        assert!(fetched.fell_back);
        assert!(matches!(fetched.result, Ok(RenderResponse::Full(_))));
        assert_eq!(service.requests().len(), 2);
    }
}

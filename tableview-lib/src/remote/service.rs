//! The render service: fetches server-rendered table markup and posts
//! row and bulk actions.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::SyncError;

/// Something that renders table markup for a URL.
///
/// Paths are resolved by the caller; implementations receive absolute URLs.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// GET markup for `url`.
    async fn fetch(&self, url: &Url) -> Result<String, SyncError>;

    /// POST form fields to `url`. Repeated keys are sent in order.
    async fn post_form(&self, url: &Url, form: &[(String, String)]) -> Result<String, SyncError>;
}

/// [`RenderService`] over HTTP.
///
/// Requests carry `HX-Request: true` so servers can answer with fragments.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tableview_lib::remote::HttpRenderService;
///
/// let service = HttpRenderService::new().with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRenderService {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for HttpRenderService {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpRenderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing client, e.g. one carrying cookies.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn read(response: reqwest::Response) -> Result<String, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(SyncError::http(status.as_u16(), message));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RenderService for HttpRenderService {
    async fn fetch(&self, url: &Url) -> Result<String, SyncError> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .header("HX-Request", "true")
            .timeout(self.timeout)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn post_form(&self, url: &Url, form: &[(String, String)]) -> Result<String, SyncError> {
        log::debug!("POST {url} ({} fields)", form.len());
        let response = self
            .client
            .post(url.clone())
            .header("HX-Request", "true")
            .timeout(self.timeout)
            .form(form)
            .send()
            .await?;
        Self::read(response).await
    }
}

// =============================================================================
// Canned responses
// =============================================================================

/// A recorded request made to a [`StaticRenderService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    Get(String),
    Post(String, Vec<(String, String)>),
}

/// [`RenderService`] answering from a fixed route table.
///
/// Routes match on URL path; unknown paths answer 404. Useful for demos
/// and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderService {
    routes: Arc<Mutex<Vec<(String, Result<String, u16>)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StaticRenderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with `markup`. Later routes for the same path win.
    pub fn route(self, path: impl Into<String>, markup: impl Into<String>) -> Self {
        self.set_route(path, Ok(markup.into()));
        self
    }

    /// Answer `path` with an HTTP error status.
    pub fn fail(self, path: impl Into<String>, status: u16) -> Self {
        self.set_route(path, Err(status));
        self
    }

    pub fn set_route(&self, path: impl Into<String>, answer: Result<String, u16>) {
        let path = path.into();
        if let Ok(mut routes) = self.routes.lock() {
            routes.retain(|(p, _)| *p != path);
            routes.push((path, answer));
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn answer(&self, url: &Url, request: RecordedRequest) -> Result<String, SyncError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let routes = self
            .routes
            .lock()
            .map_err(|_| SyncError::malformed("route table poisoned"))?;
        match routes.iter().find(|(p, _)| p == url.path()) {
            Some((_, Ok(markup))) => Ok(markup.clone()),
            Some((_, Err(status))) => Err(SyncError::http(*status, "canned failure")),
            None => Err(SyncError::http(404, format!("no route for {}", url.path()))),
        }
    }
}

#[async_trait]
impl RenderService for StaticRenderService {
    async fn fetch(&self, url: &Url) -> Result<String, SyncError> {
        self.answer(url, RecordedRequest::Get(url.to_string()))
    }

    async fn post_form(&self, url: &Url, form: &[(String, String)]) -> Result<String, SyncError> {
        self.answer(url, RecordedRequest::Post(url.to_string(), form.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_routes() {
        let service = StaticRenderService::new()
            .route("/users/body", "<div/>")
            .fail("/users/card", 500);

        let ok = service
            .fetch(&Url::parse("https://app.test/users/body?page=2").unwrap())
            .await
            .unwrap();
        assert_eq!(ok, "<div/>");

        let err = service
            .fetch(&Url::parse("https://app.test/users/card").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(500));

        let missing = service
            .post_form(&Url::parse("https://app.test/nope").unwrap(), &[])
            .await
            .unwrap_err();
        assert_eq!(missing.status_code(), Some(404));
        assert_eq!(service.requests().len(), 3);
    }
}

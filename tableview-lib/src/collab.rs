//! Confirmation dialog and side drawer collaborators.

use std::sync::Arc;
use std::sync::Mutex;

use url::Url;

use crate::config::Variant;

/// What a confirmation dialog should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub variant: Variant,
}

/// Outcome reported by a confirmation dialog.
///
/// `url` is set when the dialog itself performed the confirmed request;
/// `success` then reports whether that request succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOutcome {
    pub success: bool,
    pub url: Option<String>,
}

impl ConfirmOutcome {
    /// The user confirmed; the engine performs the request.
    pub fn confirmed() -> Self {
        Self {
            success: true,
            url: None,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            success: false,
            url: None,
        }
    }

    /// The dialog performed the request to `url` and it succeeded.
    pub fn completed(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
        }
    }

    /// The dialog performed the request to `url` and it failed.
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            success: false,
            url: Some(url.into()),
        }
    }
}

/// A modal confirmation dialog.
pub trait ConfirmDialog: Send {
    fn open(&mut self, request: ConfirmRequest);

    fn close(&mut self);
}

/// A side drawer hosting a form loaded from a URL.
pub trait Drawer: Send {
    fn open(&mut self, title: &str, content_url: &Url);

    fn close(&mut self);

    fn show_error(&mut self, message: &str);
}

/// Result of submitting the form inside a drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub success: bool,
    pub message: Option<String>,
}

impl SubmitResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// Recording implementations
// =============================================================================

/// Calls received by [`RecordingDialog`] or [`RecordingDrawer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorCall {
    Confirm(ConfirmRequest),
    OpenDrawer { title: String, url: String },
    ShowError(String),
    Close,
}

/// Shared call log; clones observe the same calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<CollaboratorCall>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: CollaboratorCall) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<CollaboratorCall> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.0.lock() {
            calls.clear();
        }
    }
}

/// [`ConfirmDialog`] that records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingDialog {
    pub log: CallLog,
}

impl RecordingDialog {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl ConfirmDialog for RecordingDialog {
    fn open(&mut self, request: ConfirmRequest) {
        self.log.push(CollaboratorCall::Confirm(request));
    }

    fn close(&mut self) {
        self.log.push(CollaboratorCall::Close);
    }
}

/// [`Drawer`] that records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingDrawer {
    pub log: CallLog,
}

impl RecordingDrawer {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl Drawer for RecordingDrawer {
    fn open(&mut self, title: &str, content_url: &Url) {
        self.log.push(CollaboratorCall::OpenDrawer {
            title: title.to_string(),
            url: content_url.to_string(),
        });
    }

    fn close(&mut self) {
        self.log.push(CollaboratorCall::Close);
    }

    fn show_error(&mut self, message: &str) {
        self.log.push(CollaboratorCall::ShowError(message.to_string()));
    }
}

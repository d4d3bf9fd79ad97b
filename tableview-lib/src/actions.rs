//! Bulk and per-row actions: confirmation text, form payloads and the
//! row action buttons rendered inside tables.

use tabledom::Element;

use crate::collab::ConfirmRequest;
use crate::config::BulkActionConfig;
use crate::config::Variant;

/// Class carried by per-row action buttons.
pub const ROW_ACTION_CLASS: &str = "action-btn";

/// Confirmation text for a bulk action over `count` rows.
///
/// `{{count}}` in the configured message is replaced with the count.
pub fn confirm_message(template: Option<&str>, action: &str, count: usize) -> String {
    match template {
        Some(template) => template.replace("{{count}}", &count.to_string()),
        None => format!("Are you sure you want to {action} {count} item(s)?"),
    }
}

/// The confirmation shown before running `action` on `count` rows.
pub fn bulk_confirm_request(action: &BulkActionConfig, count: usize) -> ConfirmRequest {
    ConfirmRequest {
        title: action
            .confirm_title
            .clone()
            .unwrap_or_else(|| "Confirm Action".to_string()),
        message: confirm_message(action.confirm_message.as_deref(), &action.key, count),
        confirm_label: if action.label.is_empty() {
            action.key.clone()
        } else {
            action.label.clone()
        },
        cancel_label: "Cancel".to_string(),
        variant: action.variant,
    }
}

/// Form fields for a bulk POST: `id` once per selected row, then the
/// fields of the `extra` JSON object.
///
/// Extra params that aren't a JSON object are logged and skipped.
pub fn bulk_form(ids: &[String], extra: Option<&str>) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = ids.iter().map(|id| ("id".to_string(), id.clone())).collect();
    let Some(extra) = extra.filter(|e| !e.trim().is_empty()) else {
        return form;
    };
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(extra) {
        Ok(fields) => {
            for (key, value) in fields {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                form.push((key, value));
            }
        }
        Err(e) => log::warn!("Ignoring invalid bulk action params {extra:?}: {e}"),
    }
    form
}

/// `url` with `id` appended as a query parameter.
pub fn with_id(url: &str, id: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("{url}{separator}id={id}")
}

/// What a row action button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowActionKind {
    /// Open the drawer on the edit form.
    Edit,
    Delete,
    Deactivate,
    Activate,
}

impl RowActionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "edit" => Some(RowActionKind::Edit),
            "delete" => Some(RowActionKind::Delete),
            "deactivate" => Some(RowActionKind::Deactivate),
            "activate" => Some(RowActionKind::Activate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RowActionKind::Edit => "edit",
            RowActionKind::Delete => "delete",
            RowActionKind::Deactivate => "deactivate",
            RowActionKind::Activate => "activate",
        }
    }

    /// Data attribute holding the action's URL.
    fn url_key(self) -> String {
        format!("{}-url", self.as_str())
    }

    fn default_title(self) -> &'static str {
        match self {
            RowActionKind::Edit => "Edit",
            RowActionKind::Delete => "Confirm Delete",
            RowActionKind::Deactivate => "Confirm Deactivation",
            RowActionKind::Activate => "Confirm Activation",
        }
    }

    fn confirm_label(self) -> &'static str {
        match self {
            RowActionKind::Edit => "Edit",
            RowActionKind::Delete => "Delete",
            RowActionKind::Deactivate => "Deactivate",
            RowActionKind::Activate => "Activate",
        }
    }

    fn variant(self) -> Variant {
        match self {
            RowActionKind::Edit => Variant::Default,
            RowActionKind::Delete => Variant::Danger,
            RowActionKind::Deactivate => Variant::Warning,
            RowActionKind::Activate => Variant::Primary,
        }
    }
}

/// A row action read from its button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionRequest {
    pub kind: RowActionKind,
    pub row_id: String,
    /// Target URL with the row ID appended.
    pub url: String,
    pub item_name: String,
    pub title: String,
    pub message: Option<String>,
}

impl RowActionRequest {
    /// Read a row action from a button's `data-*` attributes.
    ///
    /// Returns `None` for elements that aren't row action buttons, and
    /// logs buttons missing their ID or URL.
    pub fn from_element(button: &Element) -> Option<Self> {
        if !button.has_class(ROW_ACTION_CLASS) {
            return None;
        }
        let kind = button.data_value("action").and_then(RowActionKind::parse)?;
        let attr = |key: &str| button.data_value(key).filter(|v| !v.is_empty()).map(str::to_string);

        let (Some(row_id), Some(base)) = (attr("id"), attr(&kind.url_key())) else {
            log::warn!(
                "{} button missing data-{} or data-id",
                kind.as_str(),
                kind.url_key()
            );
            return None;
        };
        let title = match kind {
            RowActionKind::Edit => attr("drawer-title"),
            _ => attr("confirm-title"),
        }
        .unwrap_or_else(|| kind.default_title().to_string());

        Some(Self {
            url: with_id(&base, &row_id),
            kind,
            row_id,
            item_name: attr("item-name").unwrap_or_else(|| "this item".to_string()),
            title,
            message: attr("confirm-message"),
        })
    }

    /// Whether the action goes through the confirmation dialog.
    pub fn needs_confirmation(&self) -> bool {
        self.kind != RowActionKind::Edit
    }

    pub fn confirm_request(&self) -> ConfirmRequest {
        let message = self.message.clone().unwrap_or_else(|| {
            format!("Are you sure you want to {} {}?", self.kind.as_str(), self.item_name)
        });
        ConfirmRequest {
            title: self.title.clone(),
            message,
            confirm_label: self.kind.confirm_label().to_string(),
            cancel_label: "Cancel".to_string(),
            variant: self.kind.variant(),
        }
    }
}

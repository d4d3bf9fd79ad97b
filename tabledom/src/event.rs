/// User interaction targeted at an element by ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Button or link activation
    Click { target: String },
    /// Checkbox toggle or select commit
    Change {
        target: String,
        checked: Option<bool>,
        value: Option<String>,
    },
    /// Keystroke in a text field, carrying the full current value
    Input { target: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    Input,
}

impl Event {
    pub fn click(target: impl Into<String>) -> Self {
        Event::Click {
            target: target.into(),
        }
    }

    pub fn check(target: impl Into<String>, checked: bool) -> Self {
        Event::Change {
            target: target.into(),
            checked: Some(checked),
            value: None,
        }
    }

    pub fn select(target: impl Into<String>, value: impl Into<String>) -> Self {
        Event::Change {
            target: target.into(),
            checked: None,
            value: Some(value.into()),
        }
    }

    pub fn input(target: impl Into<String>, value: impl Into<String>) -> Self {
        Event::Input {
            target: target.into(),
            value: value.into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Click { .. } => EventKind::Click,
            Event::Change { .. } => EventKind::Change,
            Event::Input { .. } => EventKind::Input,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Event::Click { target } | Event::Change { target, .. } | Event::Input { target, .. } => {
                target
            }
        }
    }
}

/// Write the form state carried by `event` onto its target, the way a
/// browser updates a control before listeners run.
pub fn apply_form_state(document: &mut crate::Document, event: &Event) {
    match event {
        Event::Click { .. } => {}
        Event::Change { target, checked, value } => {
            document.with_element(target, |element| {
                if let Some(checked) = checked {
                    element.checked = *checked;
                    element.indeterminate = false;
                }
                if let Some(value) = value {
                    element.attrs.insert("value".to_string(), value.clone());
                }
            });
        }
        Event::Input { target, value } => {
            document.with_element(target, |element| {
                element.attrs.insert("value".to_string(), value.clone());
            });
        }
    }
}

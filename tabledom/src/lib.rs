pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod listeners;
pub mod markup;

pub use document::Document;
pub use element::{Content, Element};
pub use error::{DomError, MarkupError};
pub use event::{apply_form_state, Event, EventKind};
pub use listeners::{ListenerId, Listeners};
pub use markup::parse_fragment;

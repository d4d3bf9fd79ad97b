//! Table view-state engine
//!
//! Keeps paginated, sortable, searchable and filterable tables in sync with
//! their markup. Local tables hold every row and are evaluated in place;
//! remote tables are rendered by a server and patched into the document.

pub mod actions;
pub mod anchors;
pub mod collab;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod query;
pub mod reconcile;
pub mod registry;
pub mod remote;
pub mod selection;

pub use engine::Notice;
pub use engine::SyncOutcome;
pub use engine::TableEngine;
pub use error::Error;

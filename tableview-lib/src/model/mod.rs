//! Data model: rows, cell values and per-table view state

mod row;
mod value;
mod view;

pub use row::*;
pub use value::*;
pub use view::*;

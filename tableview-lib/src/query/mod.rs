//! Row query engine: search, filters, sort and pagination.

mod draft;
mod engine;
mod filter;
mod page;
mod search;
mod sort;

pub use draft::*;
pub use engine::*;
pub use filter::*;
pub use page::*;
pub use search::*;
pub use sort::*;

//! Selection tracking, bulk toolbar state and listener subscriptions

mod bulk;
mod subscriptions;
mod tracker;

pub use bulk::*;
pub use subscriptions::*;
pub use tracker::*;

//! Remote synchronization: request parameters, render service, response
//! interpretation and request sequencing.

mod adapter;
mod meta;
mod params;
mod patch;
mod service;

pub use adapter::*;
pub use meta::*;
pub use params::*;
pub use patch::*;
pub use service::*;

//! Error types

mod codec;
mod condition;
mod sync;

pub use codec::*;
pub use condition::*;
pub use sync::*;

/// Top-level error for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Dom(#[from] tabledom::DomError),
}

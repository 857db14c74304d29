//! Error types for review-core.

use thiserror::Error;

/// Result type alias using ReviewError.
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Boxed error carried through from an item loader.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by review sessions and the session store.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("no active review session")]
    NoActiveSession,

    #[error("item {item_id} is not part of the active review session")]
    ItemNotInSession { item_id: i64 },

    #[error("failed to load review items: {0}")]
    LoaderFailure(#[source] BoxError),

    #[error("due queue references unknown item {item_id}")]
    CorruptSession { item_id: i64 },
}

impl ReviewError {
    /// Whether the caller can fix this by issuing a different request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoActiveSession | Self::ItemNotInSession { .. })
    }
}

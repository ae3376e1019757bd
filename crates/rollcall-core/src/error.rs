//! Error types for the rotation engine.
//!
//! Every variant is recoverable: the transport layer turns it into a reply
//! for the requesting user and the process keeps running.

use chrono::TimeDelta;

use crate::catalog::CatalogError;
use crate::store::StoreError;

/// Errors surfaced by [`Engine`](crate::engine::Engine) operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No participants have been registered yet.
    #[error("no participants available")]
    NoParticipants,

    /// The category exists but has no templates.
    #[error("category '{category}' has no messages")]
    EmptyCategory {
        /// The requested category.
        category: String,
    },

    /// No category has any templates.
    #[error("no categories with messages available")]
    NoCategories,

    /// The requested category does not exist.
    #[error("category '{category}' not found")]
    NotFound {
        /// The requested category.
        category: String,
    },

    /// The cooldown gate is closed.
    #[error("rate limited for another {}s", .remaining.num_seconds())]
    RateLimited {
        /// Time left until the gate opens.
        remaining: TimeDelta,
    },

    /// Writing the state file failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The message catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

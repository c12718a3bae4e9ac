//! Engine Error Taxonomy
//!
//! Collection failures are recovered during snapshot assembly (empty category
//! plus a warning); everything else is surfaced to the caller with the store
//! left in its pre-call state.

use crate::logic::records::Category;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A host introspection category failed or was inaccessible
    #[error("collection failed for {category}: {message}")]
    Collection { category: Category, message: String },

    /// Storage transaction failed; the operation had no effect
    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Referenced baseline id does not exist
    #[error("baseline {0} not found")]
    NotFound(i64),

    /// Compare requested with neither an explicit id nor an active baseline
    #[error("no baseline specified and no baseline is active")]
    NoBaseline,

    /// Internal consistency fault that should be impossible under the
    /// store's transactional discipline. Logged loudly, never auto-repaired.
    #[error("store invariant violated: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    pub fn collection(category: Category, message: impl Into<String>) -> Self {
        EngineError::Collection {
            category,
            message: message.into(),
        }
    }
}

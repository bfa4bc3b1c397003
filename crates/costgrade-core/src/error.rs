//! Store error types.
//!
//! Every store implementation maps its driver errors into [`StoreError`] so
//! the grading workflow can classify failures without string matching.
//! "Not found" is not an error: lookups return `Ok(None)` instead.

use thiserror::Error;

/// Errors that can occur when talking to the answer or submission store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached: missing file, not a database, or no schema.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A read query failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A write failed and nothing was applied.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// A stored row could not be decoded into the data model.
    #[error("corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
}

impl StoreError {
    /// Returns `true` if the store as a whole is unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }

    /// Returns `true` if this error came from a failed write.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, StoreError::WriteFailed(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

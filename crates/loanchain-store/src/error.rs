//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced loan or principal does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A principal, intermediary or loan with this id is already stored.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Stale append: another record already took this position.
    #[error("conflict on loan {loan_id}: expected seq {expected}, got {got}")]
    Conflict {
        loan_id: String,
        expected: u64,
        got: u64,
    },

    /// Invalid data in storage or handed to the store.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// The blocking task running a query did not complete.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

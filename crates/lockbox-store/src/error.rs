//! Error types for the lockbox-store crate.
//!
//! Storage operations return [`StoreError`] via [`StoreResult`]. When the
//! vault calls through the [`Collection`](lockbox_vault::Collection) trait,
//! errors are converted into [`CollectionError`].

use lockbox_vault::CollectionError;
use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the storage engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A schema migration failed.
    #[error("migration v{version} failed: {message}")]
    Migration { version: u32, message: String },

    /// A stored row could not be turned back into a record.
    #[error("corrupt row {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for CollectionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt { id, reason } => CollectionError::Corrupt { id, reason },
            other => CollectionError::Backend(Box::new(other)),
        }
    }
}

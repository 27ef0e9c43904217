pub mod document_store;
pub mod repository;
pub mod sqlite;

pub use document_store::*;
pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("No document stored for user {user_id}")]
    NotFound { user_id: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Stored document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

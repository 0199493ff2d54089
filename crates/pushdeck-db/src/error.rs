//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    /// The row changed since it was loaded.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

impl From<DbError> for pushdeck_core::Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => pushdeck_core::Error::NotFound(msg),
            DbError::Conflict(msg) => pushdeck_core::Error::Conflict(msg),
            _ => pushdeck_core::Error::Upstream(err.to_string()),
        }
    }
}

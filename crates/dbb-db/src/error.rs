//! Error types for dbb-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Ledger read or write failed (D003)
    #[error("[D003] Ledger operation failed: {0}")]
    LedgerError(String),

    /// Mutex poisoned (D004)
    #[error("[D004] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

impl DbError {
    /// Re-label an error raised while touching the ledger.
    pub(crate) fn ledger(context: &str, err: DbError) -> Self {
        match err {
            DbError::LedgerError(_) => err,
            other => DbError::LedgerError(format!("{context}: {other}")),
        }
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}

//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Database abstraction trait for dbbuilder
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single SQL statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements in one submission
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute a statement with positional text parameters
    async fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Run a query with positional text parameters and return every row.
    ///
    /// Values are read as text, so non-text columns must be cast in SQL.
    async fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<Option<String>>>>;

    /// Check if a table or view exists in the session's current schema
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Check if a sequence exists in the session's current schema
    async fn sequence_exists(&self, name: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

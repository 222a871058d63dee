//! Test doubles shared by the unit tests

use crate::operator::{ConfirmRequest, Operator};
use async_trait::async_trait;
use dbb_core::{ChangeScript, SchemaName};
use dbb_db::{ConnectionProvider, Database, DbError, DbResult, DuckDbBackend, Session};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// In-memory DuckDB that records every `execute` call and can be told to
/// fail statements containing given text.
pub(crate) struct RecordingDb {
    inner: DuckDbBackend,
    executed: Mutex<Vec<String>>,
    batches: Mutex<Vec<String>>,
    fail_when_contains: Vec<String>,
}

impl RecordingDb {
    pub(crate) fn new() -> Self {
        Self::failing_on(&[])
    }

    pub(crate) fn failing_on(patterns: &[&str]) -> Self {
        Self {
            inner: DuckDbBackend::in_memory().unwrap(),
            executed: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            fail_when_contains: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Statements passed to `execute`, ledger DDL excluded, in call order
    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| !sql.contains("DB_BUILD_SCRIPT"))
            .cloned()
            .collect()
    }

    pub(crate) fn batches(&self) -> Vec<String> {
        self.batches.lock().unwrap().clone()
    }

    fn should_fail(&self, sql: &str) -> bool {
        self.fail_when_contains.iter().any(|p| sql.contains(p))
    }
}

#[async_trait]
impl Database for RecordingDb {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.executed.lock().unwrap().push(sql.to_string());
        if self.should_fail(sql) {
            return Err(DbError::ExecutionError(format!("rejected: {}", sql)));
        }
        self.inner.execute(sql).await
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.batches.lock().unwrap().push(sql.to_string());
        if self.should_fail(sql) {
            return Err(DbError::ExecutionError(format!("rejected: {}", sql)));
        }
        self.inner.execute_batch(sql).await
    }

    async fn execute_with_params(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        self.inner.execute_with_params(sql, params).await
    }

    async fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<Option<String>>>> {
        self.inner.query_rows(sql, params).await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.relation_exists(name).await
    }

    async fn sequence_exists(&self, name: &str) -> DbResult<bool> {
        self.inner.sequence_exists(name).await
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }
}

/// Hands out sessions over one shared database, whatever the schema.
pub(crate) struct SharedProvider {
    pub(crate) db: Arc<RecordingDb>,
    pub(crate) user: String,
}

impl SharedProvider {
    pub(crate) fn new(db: Arc<RecordingDb>, user: &str) -> Self {
        Self {
            db,
            user: user.to_string(),
        }
    }
}

impl ConnectionProvider for SharedProvider {
    fn connect(&self, _schema: &SchemaName, _credentials: &Path) -> DbResult<Session> {
        let db: Arc<dyn Database> = self.db.clone();
        Ok(Session {
            db,
            user: self.user.clone(),
            location: ":memory:".to_string(),
        })
    }
}

/// Operator with a fixed answer that remembers what it was shown.
#[derive(Default)]
pub(crate) struct ScriptedOperator {
    pub(crate) approve: bool,
    pub(crate) confirmations: Mutex<Vec<Vec<String>>>,
    pub(crate) drifts: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub(crate) fn approving() -> Self {
        Self {
            approve: true,
            ..Default::default()
        }
    }

    pub(crate) fn declining() -> Self {
        Self::default()
    }
}

impl Operator for ScriptedOperator {
    fn confirm(&self, request: &ConfirmRequest<'_>) -> bool {
        let names = request.pending.iter().map(|s| s.name().to_string()).collect();
        self.confirmations.lock().unwrap().push(names);
        self.approve
    }

    fn notify_drift(&self, _schema: &SchemaName, latest: &ChangeScript) {
        self.drifts.lock().unwrap().push(latest.to_string());
    }
}

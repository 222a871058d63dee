//! Statement execution for change script content
//!
//! Every statement goes to the database on its own, strictly in file order,
//! after the configured throttle delay.

use crate::error::{RunError, RunResult};
use dbb_core::splitter::{split_rules, split_statements, strip_directive};
use dbb_core::{plan_script_dir, ChangeScript, ContentKind, LineEnding, ScriptFile, ScriptPlan};
use dbb_db::{Database, DbResult};
use std::path::Path;
use std::time::Duration;

/// Counts from executing one change script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Files executed, scrub excluded
    pub files: usize,

    /// Statements that succeeded
    pub statements: usize,

    /// Rule statements that failed and were skipped
    pub skipped: usize,

    /// Whether a scrub file ran (successfully or not)
    pub scrubbed: bool,
}

impl ExecutionSummary {
    pub(crate) fn absorb(&mut self, other: ExecutionSummary) {
        self.files += other.files;
        self.statements += other.statements;
        self.skipped += other.skipped;
        self.scrubbed |= other.scrubbed;
    }
}

/// Executes split SQL against one database session
pub struct StatementExecutor<'a> {
    db: &'a dyn Database,
    throttle: Duration,
}

impl<'a> StatementExecutor<'a> {
    /// Create a new executor
    pub fn new(db: &'a dyn Database, throttle: Duration) -> Self {
        Self { db, throttle }
    }

    async fn submit(&self, statement: &str) -> DbResult<()> {
        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }
        log::info!("Executing statement: {}", statement);
        self.db.execute(statement).await?;
        Ok(())
    }

    /// Plan and execute a change script's content directory
    pub async fn run_script(&self, script: &ChangeScript) -> RunResult<ExecutionSummary> {
        let dir = script.content().ok_or_else(|| RunError::MissingContent {
            script: script.to_string(),
        })?;
        log::info!("Running change script {}", script);
        let plan = plan_script_dir(dir)?;
        if plan.is_empty() {
            log::warn!("Change script {} has no runnable files", script);
        } else {
            log::debug!("Planned {} file(s) for {}", plan.len(), script);
        }
        self.run_plan(&plan).await
    }

    /// Execute a plan: the scrub file first, then every file in order
    pub async fn run_plan(&self, plan: &ScriptPlan) -> RunResult<ExecutionSummary> {
        let mut summary = ExecutionSummary::default();

        match &plan.scrub {
            Some(path) => {
                self.run_scrub(path).await;
                summary.scrubbed = true;
            }
            None => log::info!("No scrub file present"),
        }

        for file in &plan.files {
            summary.absorb(self.run_file(file).await?);
        }

        Ok(summary)
    }

    /// Execute the scrub file as one batch. Failures are logged, never raised.
    pub async fn run_scrub(&self, path: &Path) {
        log::info!("Running scrub file {}", path.display());
        let sql = match std::fs::read_to_string(path) {
            Ok(sql) => sql,
            Err(e) => {
                log::error!("Failed to read scrub file {}: {}", path.display(), e);
                return;
            }
        };
        if let Err(e) = self.db.execute_batch(strip_directive(&sql)).await {
            log::error!("Scrub file {} failed: {}", path.display(), e);
        }
    }

    /// Execute one SQL file according to its content kind
    pub async fn run_file(&self, file: &ScriptFile) -> RunResult<ExecutionSummary> {
        let sql = std::fs::read_to_string(&file.path).map_err(|source| RunError::ReadScript {
            path: file.path.display().to_string(),
            source,
        })?;
        log::debug!("Executing {} as {}", file.path.display(), file.kind);

        let mut summary = match file.kind {
            ContentKind::Statements | ContentKind::Procedural => {
                self.run_fail_fast(&file.path, &sql, file.kind).await?
            }
            ContentKind::Rules => self.run_rules(&file.path, &sql).await,
        };
        summary.files = 1;
        Ok(summary)
    }

    async fn run_fail_fast(
        &self,
        path: &Path,
        sql: &str,
        kind: ContentKind,
    ) -> RunResult<ExecutionSummary> {
        let mut summary = ExecutionSummary::default();
        for statement in split_statements(sql, kind) {
            if let Err(source) = self.submit(&statement).await {
                log::error!(
                    "Error writing statement from file '{}', statement:\n{}",
                    path.display(),
                    statement
                );
                return Err(RunError::Statement {
                    path: path.display().to_string(),
                    statement,
                    source,
                });
            }
            summary.statements += 1;
        }
        Ok(summary)
    }

    /// Rules split on the CRLF delimiter first. Each failing rule triggers a
    /// re-split of the whole text on LF; that pass runs best effort and the
    /// failed CRLF rule is then skipped.
    async fn run_rules(&self, path: &Path, sql: &str) -> ExecutionSummary {
        let mut summary = ExecutionSummary::default();

        for rule in split_rules(sql, LineEnding::Crlf) {
            let Err(e) = self.submit(&rule).await else {
                summary.statements += 1;
                continue;
            };

            log::info!(
                "CRLF rule delimiter failed in {}, trying LF: {}",
                path.display(),
                e
            );
            for lf_rule in split_rules(sql, LineEnding::Lf) {
                match self.submit(&lf_rule).await {
                    Ok(()) => summary.statements += 1,
                    Err(e) => {
                        log::error!(
                            "Error creating rule in {}: {}\n{}",
                            path.display(),
                            e,
                            lf_rule
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }

        summary
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;

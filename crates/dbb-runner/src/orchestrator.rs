//! Per-schema orchestration: discover, reconcile, confirm, execute, record

use crate::error::RunResult;
use crate::executor::{ExecutionSummary, StatementExecutor};
use crate::operator::{ConfirmRequest, Operator};
use dbb_core::{
    discover_scripts, reconcile, ChangeScript, Config, LedgerState, ProfileKind, SchemaConfig,
    SchemaName,
};
use dbb_db::{ConnectionProvider, Ledger};

/// What a run does after reconciling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Confirm and execute pending scripts
    #[default]
    Apply,
    /// Report the pending scripts without touching the database
    Status,
}

/// How a schema's run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// Nothing pending (including an empty ledger on a non-test identity)
    UpToDate,
    /// The operator declined the pending scripts
    Declined,
    /// Pending scripts were executed and recorded
    Applied,
    /// The database is ahead of the filesystem
    Drifted,
    /// Status mode: reported only
    Reported,
}

impl std::fmt::Display for SchemaOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaOutcome::UpToDate => write!(f, "up-to-date"),
            SchemaOutcome::Declined => write!(f, "declined"),
            SchemaOutcome::Applied => write!(f, "applied"),
            SchemaOutcome::Drifted => write!(f, "drifted"),
            SchemaOutcome::Reported => write!(f, "reported"),
        }
    }
}

/// Result of running one schema
#[derive(Debug, Clone)]
pub struct SchemaReport {
    pub schema: SchemaName,
    pub user: String,
    pub location: String,
    pub test_identity: bool,
    pub state: LedgerState,
    pub pending: Vec<ChangeScript>,
    /// Applied scripts, carrying their new ledger ids
    pub applied: Vec<ChangeScript>,
    pub outcome: SchemaOutcome,
    pub execution: ExecutionSummary,
}

/// Drives every configured schema, one at a time.
///
/// A session is opened per schema and dropped before the next schema starts.
pub struct Orchestrator<'a> {
    config: &'a Config,
    profile: ProfileKind,
    provider: &'a dyn ConnectionProvider,
    operator: &'a dyn Operator,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        profile: ProfileKind,
        provider: &'a dyn ConnectionProvider,
        operator: &'a dyn Operator,
    ) -> Self {
        Self {
            config,
            profile,
            provider,
            operator,
        }
    }

    /// Run every schema in configuration order, stopping at the first failure.
    pub async fn run(&self, mode: RunMode) -> RunResult<Vec<SchemaReport>> {
        let mut reports = Vec::with_capacity(self.config.schemas.len());
        for schema in &self.config.schemas {
            let report = self
                .run_schema(schema, mode)
                .await
                .map_err(|e| e.in_schema(schema.name.as_str()))?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Run a single schema
    pub async fn run_schema(&self, schema: &SchemaConfig, mode: RunMode) -> RunResult<SchemaReport> {
        let root = self.config.scripts_root(schema);
        log::info!("Processing schema {} from {}", schema.name, root.display());
        let scripts = discover_scripts(&root)?;

        let credentials = self.config.credentials_path(schema, self.profile)?;
        let session = self.provider.connect(&schema.name, &credentials)?;
        let db = session.db.as_ref();
        let ledger = Ledger::new(db);
        let test_identity = self.config.is_test_user(&session.user);

        if mode == RunMode::Apply && ledger.ensure_exists().await? {
            log::info!("Ledger created for schema {}", schema.name);
        }
        let snapshot = ledger
            .snapshot(self.config.force_rebuild_flag.as_deref())
            .await?;
        let reconciliation = reconcile(scripts, &snapshot, test_identity);
        log::info!(
            "Schema {} is {} with {} pending script(s)",
            schema.name,
            reconciliation.state,
            reconciliation.pending.len()
        );

        let mut report = SchemaReport {
            schema: schema.name.clone(),
            user: session.user.clone(),
            location: session.location.clone(),
            test_identity,
            state: reconciliation.state,
            pending: reconciliation.pending,
            applied: Vec::new(),
            outcome: SchemaOutcome::UpToDate,
            execution: ExecutionSummary::default(),
        };

        if let LedgerState::Drifted { latest } = &report.state {
            self.operator.notify_drift(&schema.name, latest);
            report.outcome = SchemaOutcome::Drifted;
            return Ok(report);
        }
        if mode == RunMode::Status {
            report.outcome = SchemaOutcome::Reported;
            return Ok(report);
        }
        if report.pending.is_empty() {
            log::info!("Schema {} has nothing to apply", schema.name);
            return Ok(report);
        }

        let request = ConfirmRequest {
            schema: &schema.name,
            user: &session.user,
            location: &session.location,
            pending: &report.pending,
        };
        if !self.operator.confirm(&request) {
            log::info!("Changes to schema {} declined", schema.name);
            report.outcome = SchemaOutcome::Declined;
            return Ok(report);
        }

        let executor = StatementExecutor::new(db, self.config.throttle());
        let mut ledger_table_confirmed_present = false;
        for script in &report.pending {
            report.execution.absorb(executor.run_script(script).await?);

            if !ledger_table_confirmed_present {
                ledger.ensure_exists().await?;
                ledger_table_confirmed_present = true;
            }
            report.applied.push(ledger.append(script).await?);
        }

        report.outcome = SchemaOutcome::Applied;
        log::info!(
            "Applied {} script(s) to schema {}",
            report.applied.len(),
            schema.name
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

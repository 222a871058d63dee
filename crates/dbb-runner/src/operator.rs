//! Operator interaction points used during a run

use dbb_core::{ChangeScript, SchemaName};

/// What the operator is asked to approve before a schema's scripts run
#[derive(Debug, Clone, Copy)]
pub struct ConfirmRequest<'a> {
    pub schema: &'a SchemaName,
    pub user: &'a str,
    pub location: &'a str,
    pub pending: &'a [ChangeScript],
}

/// Decisions and notices the orchestrator delegates to whoever drives the run.
///
/// Both calls may block (a terminal prompt, for instance).
pub trait Operator: Send + Sync {
    /// Return true to apply `request.pending`.
    fn confirm(&self, request: &ConfirmRequest<'_>) -> bool;

    /// The ledger's latest entry is missing from the filesystem.
    fn notify_drift(&self, schema: &SchemaName, latest: &ChangeScript);
}

/// Approves everything and logs drift. Used for `--yes` style runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl Operator for AutoApprove {
    fn confirm(&self, request: &ConfirmRequest<'_>) -> bool {
        log::info!(
            "Auto-approving {} script(s) for schema {}",
            request.pending.len(),
            request.schema
        );
        true
    }

    fn notify_drift(&self, schema: &SchemaName, latest: &ChangeScript) {
        log::warn!(
            "Schema {} is ahead of the filesystem; latest ledger entry {} is not on disk",
            schema,
            latest
        );
    }
}

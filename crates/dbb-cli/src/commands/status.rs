//! Status command implementation

use anyhow::{Context, Result};
use dbb_core::LedgerState;
use dbb_db::DuckDbProvider;
use dbb_runner::{AutoApprove, Orchestrator, RunMode, SchemaReport};
use serde::Serialize;

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{load_config, profile_kind};

/// One pending or drifted script, for JSON output
#[derive(Debug, Serialize)]
struct ScriptOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    script_id: Option<i64>,
    order: String,
    name: String,
}

/// Status for one schema, for JSON output
#[derive(Debug, Serialize)]
struct SchemaStatus {
    schema: String,
    user: String,
    location: String,
    test_identity: bool,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    drifted_entry: Option<ScriptOutput>,
    pending: Vec<ScriptOutput>,
}

fn script_output(script: &dbb_core::ChangeScript) -> ScriptOutput {
    ScriptOutput {
        script_id: script.ledger_id(),
        order: script.order().normalize().to_string(),
        name: script.name().to_string(),
    }
}

impl From<&SchemaReport> for SchemaStatus {
    fn from(report: &SchemaReport) -> Self {
        let drifted_entry = match &report.state {
            LedgerState::Drifted { latest } => Some(script_output(latest)),
            _ => None,
        };
        Self {
            schema: report.schema.to_string(),
            user: report.user.clone(),
            location: report.location.clone(),
            test_identity: report.test_identity,
            state: report.state.to_string(),
            drifted_entry,
            pending: report.pending.iter().map(script_output).collect(),
        }
    }
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let orchestrator =
        Orchestrator::new(&config, profile_kind(global), &DuckDbProvider, &AutoApprove);
    let reports = orchestrator
        .run(RunMode::Status)
        .await
        .context("Failed to read schema status")?;

    let statuses: Vec<SchemaStatus> = reports.iter().map(SchemaStatus::from).collect();
    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        OutputFormat::Text => {
            for status in &statuses {
                print_text(status);
            }
        }
    }
    Ok(())
}

fn print_text(status: &SchemaStatus) {
    println!(
        "{} ({} at {}): {}",
        status.schema, status.user, status.location, status.state
    );
    if let Some(entry) = &status.drifted_entry {
        println!(
            "  ledger entry not on disk: {}) {}",
            entry.order, entry.name
        );
    }
    if status.pending.is_empty() {
        println!("  nothing pending");
    }
    for script in &status.pending {
        println!("  {}) {}", script.order, script.name);
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;

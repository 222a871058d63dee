//! Apply command implementation

use anyhow::{Context, Result};
use dbb_db::DuckDbProvider;
use dbb_runner::{AutoApprove, Operator, Orchestrator, RunMode, SchemaOutcome, SchemaReport};

use crate::cli::GlobalArgs;
use crate::commands::common::{load_config, profile_kind};
use crate::commands::prompt::PromptOperator;

/// Execute the apply command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;

    let prompt;
    let operator: &dyn Operator = if global.yes {
        &AutoApprove
    } else {
        prompt = PromptOperator::stdio();
        &prompt
    };

    let orchestrator = Orchestrator::new(
        &config,
        profile_kind(global),
        &DuckDbProvider,
        operator,
    );
    let reports = orchestrator
        .run(RunMode::Apply)
        .await
        .context("Failed to apply change scripts")?;

    println!();
    for report in &reports {
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &SchemaReport) {
    match report.outcome {
        SchemaOutcome::Applied => {
            println!(
                "  ✓ {} - applied {} script(s), {} statement(s)",
                report.schema,
                report.applied.len(),
                report.execution.statements
            );
            for script in &report.applied {
                println!("      {}", script);
            }
            if report.execution.skipped > 0 {
                println!(
                    "    {} rule statement(s) failed and were skipped",
                    report.execution.skipped
                );
            }
        }
        SchemaOutcome::Drifted => {
            println!("  ! {} - database is ahead of the file system", report.schema)
        }
        SchemaOutcome::Declined => println!("  - {} - declined", report.schema),
        SchemaOutcome::UpToDate | SchemaOutcome::Reported => {
            println!("  - {} - nothing to apply ({})", report.schema, report.state)
        }
    }
}

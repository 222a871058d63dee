//! dbb-runner - Change script execution for dbbuilder
//!
//! This crate executes split SQL against a session, reconciles each schema
//! against its ledger, and drives the confirm / execute / record cycle.

pub mod error;
pub mod executor;
pub mod operator;
pub mod orchestrator;

#[cfg(test)]
mod test_support;

pub use error::{RunError, RunResult};
pub use executor::{ExecutionSummary, StatementExecutor};
pub use operator::{AutoApprove, ConfirmRequest, Operator};
pub use orchestrator::{Orchestrator, RunMode, SchemaOutcome, SchemaReport};

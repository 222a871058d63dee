//! dbb-core - Core library for dbbuilder
//!
//! This crate provides the change script model, script discovery, per-script
//! execution planning, statement splitting, ledger reconciliation, and
//! configuration parsing shared by all dbbuilder components.

pub mod config;
pub mod content;
pub mod discovery;
pub mod error;
mod newtype_string;
pub mod reconcile;
pub mod script;
pub mod splitter;

pub use config::{Config, ConnectionProfile, ProfileKind, SchemaConfig};
pub use content::{plan_script_dir, ScriptFile, ScriptPlan};
pub use discovery::discover_scripts;
pub use error::{CoreError, CoreResult};
pub use newtype_string::SchemaName;
pub use reconcile::{reconcile, LedgerSnapshot, LedgerState, Reconciliation};
pub use script::ChangeScript;
pub use splitter::{ContentKind, LineEnding};
pub use rust_decimal::Decimal;

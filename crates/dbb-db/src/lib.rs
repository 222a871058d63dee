//! dbb-db - Database layer for dbbuilder
//!
//! This crate provides the `Database` trait, its DuckDB implementation,
//! per-schema session acquisition, and the script ledger.

pub mod duckdb;
pub mod error;
pub mod ledger;
pub mod provider;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use ledger::{Ledger, LedgerEntry, FORCED_REBUILD_ORDER, LEDGER_SEQUENCE, LEDGER_TABLE};
pub use provider::{ConnectionProvider, DuckDbProvider, Session};
pub use traits::Database;

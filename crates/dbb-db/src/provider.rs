//! Per-schema session acquisition

use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::traits::Database;
use dbb_core::{ConnectionProfile, SchemaName};
use std::path::Path;
use std::sync::Arc;

/// An open session against one schema's database
#[derive(Clone)]
pub struct Session {
    /// Database handle
    pub db: Arc<dyn Database>,

    /// Identity the session runs as
    pub user: String,

    /// Where the session is connected, for operator display
    pub location: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("db_type", &self.db.db_type())
            .field("user", &self.user)
            .field("location", &self.location)
            .finish()
    }
}

/// Opens sessions from a credential file.
///
/// A session is acquired once per schema and dropped when that schema's run ends.
pub trait ConnectionProvider: Send + Sync {
    fn connect(&self, schema: &SchemaName, credentials: &Path) -> DbResult<Session>;
}

/// Provider backed by DuckDB credential profiles
#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbProvider;

impl ConnectionProvider for DuckDbProvider {
    fn connect(&self, schema: &SchemaName, credentials: &Path) -> DbResult<Session> {
        let profile = ConnectionProfile::load(credentials).map_err(|e| {
            DbError::ConnectionError(format!("schema '{}': {}", schema, e))
        })?;
        if profile.is_memory() {
            log::warn!("Schema {} uses an in-memory database; changes will not persist", schema);
        }

        let backend = DuckDbBackend::new(&profile.path)?;
        log::info!(
            "Connected to {} as {} for schema {}",
            profile.path,
            profile.user,
            schema
        );

        Ok(Session {
            db: Arc::new(backend),
            user: profile.user,
            location: profile.path,
        })
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;

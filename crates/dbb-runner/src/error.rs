//! Error types for dbb-runner

use dbb_core::CoreError;
use dbb_db::DbError;
use thiserror::Error;

/// Errors raised while applying change scripts
#[derive(Error, Debug)]
pub enum RunError {
    /// R001: A statement failed in fail-fast content
    #[error("[R001] Statement failed in {path}: {source}\n{statement}")]
    Statement {
        path: String,
        statement: String,
        #[source]
        source: DbError,
    },

    /// R002: A script file could not be read
    #[error("[R002] Failed to read {path}: {source}")]
    ReadScript {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// R003: A pending script carries no content directory
    #[error("[R003] Change script has no content directory: {script}")]
    MissingContent { script: String },

    /// R004: A schema's run failed
    #[error("[R004] Schema '{schema}' failed: {source}")]
    Schema {
        schema: String,
        #[source]
        source: Box<RunError>,
    },

    /// Discovery, planning, or configuration error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Connection, execution, or ledger error
    #[error(transparent)]
    Db(#[from] DbError),
}

impl RunError {
    /// Attach the schema a failure happened in.
    pub(crate) fn in_schema(self, schema: &str) -> Self {
        RunError::Schema {
            schema: schema.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for RunError
pub type RunResult<T> = Result<T, RunError>;

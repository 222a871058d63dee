//! Error types for dbb-core

use thiserror::Error;

/// Core error type for dbbuilder
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Script root directory not found
    #[error("[E004] Script directory not found: {path}")]
    ScriptRootNotFound { path: String },

    /// E005: An entry name does not start with an ordering key
    #[error("[E005] Could not parse order from name '{name}' in {dir}")]
    OrderParse { name: String, dir: String },

    /// E006: Two entries share the same ordering key
    #[error("[E006] Duplicate order {order} in {dir}: '{first}' and '{second}'")]
    DuplicateOrder {
        order: String,
        first: String,
        second: String,
        dir: String,
    },

    /// E007: A change script's content is not a directory
    #[error("[E007] Change script content is not a directory: {path}")]
    NotADirectory { path: String },

    /// E008: IO error with file path context
    #[error("[E008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

impl CoreError {
    /// Wrap an IO error with the path that produced it.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dbb_core::{Config, ProfileKind};

use crate::cli::GlobalArgs;

/// Locate and load the configuration file.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let path = Config::resolve_path(global.config.as_deref())?;
    if global.verbose {
        eprintln!("[verbose] Loading config from {}", path.display());
    }
    Config::load(&path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Credential profile selected by the flags.
pub(crate) fn profile_kind(global: &GlobalArgs) -> ProfileKind {
    if global.test_profile {
        ProfileKind::Test
    } else {
        ProfileKind::Standard
    }
}

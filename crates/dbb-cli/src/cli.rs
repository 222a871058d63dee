//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// dbbuilder - apply ordered SQL change scripts to each configured schema
#[derive(Parser, Debug)]
#[command(name = "dbb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (defaults to `apply`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use each schema's test credentials
    #[arg(long, global = true)]
    pub test_profile: bool,

    /// Apply pending scripts without asking for confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Default)]
pub enum Commands {
    /// Confirm and apply pending change scripts
    #[default]
    Apply,

    /// Show each schema's ledger state and pending scripts
    Status(StatusArgs),
}

/// Arguments for the status command
#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

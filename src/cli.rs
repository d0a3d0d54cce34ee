//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use merge_wizard::output::OutputConfig;

/// Merge Wizard - Fold divergent copies of a directory tree into one
#[derive(Parser, Debug)]
#[command(name = "merge-wizard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge one or more SOURCE trees onto BASE into a new output tree
    Merge(commands::merge::MergeArgs),

    /// Classify BASE against SOURCE without writing anything
    Compare(commands::compare::CompareArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command and return the process exit code.
    pub fn execute(self) -> Result<i32> {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .init();

        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Merge(args) => commands::merge::execute(args, &output),
            Commands::Compare(args) => commands::compare::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

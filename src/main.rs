//! # Merge Wizard CLI
//!
//! Binary entry point for the `merge-wizard` command-line tool.
//!
//! Parses arguments with `clap`, runs the selected command and maps its
//! result onto the process exit code (see [`merge_wizard::exit_codes`]).
//! All merge logic lives in the `merge_wizard` library; this binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use merge_wizard::exit_codes;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let code = cli.execute()?;
    if code != exit_codes::SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}

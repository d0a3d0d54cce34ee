//! # Compare Command Implementation
//!
//! The `compare` subcommand runs collection and classification only. It
//! prints one `<CODE> <path>` line per changed path (`A` added, `D` removed,
//! `M` modified) followed by the counts, and never writes to disk.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use merge_wizard::exit_codes;
use merge_wizard::output::{emoji, OutputConfig};
use merge_wizard::phases::classify::StatusCounts;
use merge_wizard::phases::orchestrator;
use merge_wizard::report;
use merge_wizard::suggestions;

/// Arguments for the compare command
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Reference tree
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Tree compared against BASE
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Extra glob pattern to leave out of the comparison (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Only print the counts
    #[arg(short, long)]
    pub summary: bool,
}

/// Execute the compare command.
pub fn execute(args: CompareArgs, output: &OutputConfig) -> Result<i32> {
    if !args.base.is_dir() {
        return Err(suggestions::root_not_found("BASE", &args.base));
    }
    if !args.source.is_dir() {
        return Err(suggestions::root_not_found("SOURCE", &args.source));
    }

    let records = orchestrator::execute_compare(&args.base, &args.source, &args.ignore)?;
    let counts = StatusCounts::from_records(&records);

    if !args.summary {
        let listing = report::render_listing(
            records
                .iter()
                .map(|record| (record.relative_path.as_str(), record.status)),
        );
        print!("{}", listing);
        if counts.changed() > 0 {
            println!();
        }
    }

    if counts.changed() == 0 {
        println!("{} Trees are identical", emoji(output, "✅", "[OK]"));
    }
    println!(
        "Summary: {} added, {} modified, {} removed, {} unchanged",
        counts.added, counts.modified, counts.removed, counts.unchanged
    );

    Ok(exit_codes::SUCCESS)
}

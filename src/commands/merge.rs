//! # Merge Command Implementation
//!
//! The `merge` subcommand builds a [`RunConfig`] from, in increasing order of
//! precedence:
//!
//! 1. built-in defaults
//! 2. the YAML configuration file (`--config`, or `merge-wizard.yaml` in the
//!    current directory when present)
//! 3. options remembered by an earlier `--remember` run (`--last`)
//! 4. explicit command-line flags
//!
//! It then confirms replacing an existing output directory, runs the engine
//! with a progress display and prints a short summary. The full per-path
//! listing goes to the report file.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use merge_wizard::cancel::CancellationToken;
use merge_wizard::config::{self, MergeMode, RunConfig, SeedMode};
use merge_wizard::defaults;
use merge_wizard::exit_codes;
use merge_wizard::output::{emoji, OutputConfig};
use merge_wizard::phases::orchestrator::{self, ProgressFn};
use merge_wizard::progress;
use merge_wizard::report::RunSummary;
use merge_wizard::settings::{self, LastRun};
use merge_wizard::suggestions;

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Reference tree the merge starts from
    #[arg(value_name = "BASE")]
    pub base: Option<PathBuf>,

    /// Divergent trees folded onto BASE, in order
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<PathBuf>,

    /// Output directory (replaced if it exists)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Strategy for modified text files (diff, additions)
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<MergeMode>,

    /// Initial content of the output tree (base, empty)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<SeedMode>,

    /// Number of merge workers (0 = one per CPU)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Report file (defaults to <OUTPUT>.merge_report.txt beside the output)
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Extra glob pattern to leave out of the comparison (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "MERGE_WIZARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Replace an existing output directory without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Save BASE, SOURCE, output, mode and seed for a later --last
    #[arg(long)]
    pub remember: bool,

    /// Reuse the options saved by the last --remember run
    #[arg(long)]
    pub last: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the merge command and return the process exit code.
pub fn execute(args: MergeArgs, output: &OutputConfig) -> Result<i32> {
    let settings_path = defaults::default_settings_path();
    let remembered = if args.last {
        match settings::load(&settings_path)? {
            Some(last) => Some(last),
            None => return Err(suggestions::nothing_remembered(&settings_path)),
        }
    } else {
        None
    };

    let config = build_config(&args, remembered.as_ref())?;
    check_roots(&config)?;

    if config.output_root.exists() && !args.force && !confirm_replace(&config.output_root)? {
        if !args.quiet {
            println!("Merge cancelled; {} left untouched", config.output_root.display());
        }
        return Ok(exit_codes::ABORTED);
    }

    if !args.quiet {
        println!(
            "{} Merging {} source(s) onto {}",
            emoji(output, "🔀", "[MERGE]"),
            config.sources.len(),
            config.base_root.display()
        );
    }

    let summary = run_with_progress(&config, output, args.quiet)?;

    if args.remember {
        let last = LastRun {
            base: Some(absolute(&config.base_root)),
            sources: config.sources.iter().map(|s| absolute(s)).collect(),
            output: Some(absolute(&config.output_root)),
            mode: Some(config.mode),
            seed: Some(config.seed),
        };
        settings::save(&settings_path, &last)?;
        log::info!("Options remembered in {}", settings_path.display());
    }

    if !args.quiet {
        print_summary(&summary, &config, output);
    }

    Ok(exit_codes::for_status(summary.status()))
}

/// Layer file, remembered and explicit options into one configuration.
fn build_config(args: &MergeArgs, remembered: Option<&LastRun>) -> Result<RunConfig> {
    let base = args
        .base
        .clone()
        .or_else(|| remembered.and_then(|last| last.base.clone()));
    let sources = if args.sources.is_empty() {
        remembered.map(|last| last.sources.clone()).unwrap_or_default()
    } else {
        args.sources.clone()
    };
    let output_root = args
        .output
        .clone()
        .or_else(|| remembered.and_then(|last| last.output.clone()));

    let (Some(base), false, Some(output_root)) = (base, sources.is_empty(), output_root) else {
        return Err(suggestions::missing_roots());
    };

    let mut config = RunConfig::new(base, sources, output_root);

    let config_path = args.config.clone().or_else(|| {
        let local = PathBuf::from(defaults::CONFIG_FILE);
        local.is_file().then_some(local)
    });
    if let Some(path) = config_path {
        log::debug!("Loading configuration from {}", path.display());
        config = config.with_file(&config::from_file(&path)?);
    }

    if let Some(last) = remembered {
        if let Some(mode) = last.mode {
            config = config.with_mode(mode);
        }
        if let Some(seed) = last.seed {
            config = config.with_seed(seed);
        }
    }

    if let Some(mode) = args.mode {
        config = config.with_mode(mode);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(jobs) = args.jobs {
        config = config.with_jobs(jobs);
    }
    if let Some(report) = &args.report {
        config = config.with_report_path(report.clone());
    }
    config.ignore.extend(args.ignore.iter().cloned());

    Ok(config)
}

fn check_roots(config: &RunConfig) -> Result<()> {
    if !config.base_root.is_dir() {
        return Err(suggestions::root_not_found("BASE", &config.base_root));
    }
    for source in &config.sources {
        if !source.is_dir() {
            return Err(suggestions::root_not_found("SOURCE", source));
        }
    }
    Ok(())
}

/// Ask before replacing an existing output; refuse when nobody can answer.
fn confirm_replace(output_root: &Path) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(suggestions::output_exists(output_root));
    }
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "{} already exists. Replace it?",
            output_root.display()
        ))
        .default(false)
        .interact()?;
    Ok(answer)
}

fn run_with_progress(config: &RunConfig, output: &OutputConfig, quiet: bool) -> Result<RunSummary> {
    let bar = if output.interactive && !quiet {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos:>5}/{len:5} {wide_msg}")?
                .progress_chars("##-"),
        );
        Some(bar)
    } else {
        None
    };

    let report_progress = |current: usize, total: usize, label: &str| match &bar {
        Some(bar) => {
            bar.set_length(total as u64);
            bar.set_position(current as u64);
            bar.set_message(label.to_string());
        }
        None => eprintln!("{}", progress::render(current, total, label)),
    };
    let progress: Option<ProgressFn<'_>> = if quiet {
        None
    } else {
        let report: ProgressFn<'_> = &report_progress;
        Some(report)
    };

    let cancel = CancellationToken::new();
    let result = orchestrator::execute_merge(config, &cancel, progress);

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    Ok(result?)
}

fn print_summary(summary: &RunSummary, config: &RunConfig, output: &OutputConfig) {
    println!();
    println!("{}", output.status_line(summary.status()));
    for stage in &summary.stages {
        let counts = stage.counts();
        println!(
            "  Source {}: {} added, {} modified, {} removed, {} unchanged, {} conflicts",
            stage.index,
            counts.added,
            counts.modified,
            counts.removed,
            counts.unchanged,
            counts.conflicts
        );
    }
    println!(
        "  Wrote {}",
        HumanBytes(summary.counts().bytes_written)
    );
    println!(
        "{} Output: {}",
        emoji(output, "📁", "-"),
        config.output_root.display()
    );
    println!(
        "{} Report: {}",
        emoji(output, "📄", "-"),
        config.report_path.display()
    );
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

//! Command-line interface module for tidydesk.
//!
//! This is the launcher layer over the engine: it parses arguments,
//! resolves defaults, loads the scan filter configuration, and renders
//! reports. All organizing decisions live in [`crate::engine`].

use crate::config::ScanConfig;
use crate::engine::{OrganizeOptions, Organizer, SortMode};
use crate::output::OutputFormatter;
use crate::watcher::{self, CancelToken};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Smart file organizer with duplicate detection.
#[derive(Debug, Parser)]
#[command(name = "tidydesk", version, about)]
pub struct Cli {
    /// Folder to scan. Defaults to ~/Downloads.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Folder organized files are moved into. Defaults to <source>/Organized.
    #[arg(long)]
    pub destination: Option<PathBuf>,

    /// Group files by modification month ('date') or inferred workflow ('source').
    #[arg(long, value_enum, default_value_t = SortModeArg::Date)]
    pub sort_mode: SortModeArg,

    /// Preview actions without moving files.
    #[arg(long)]
    pub dry_run: bool,

    /// Only process top-level files of the source.
    #[arg(long)]
    pub non_recursive: bool,

    /// Do not remove empty folders from the source.
    #[arg(long)]
    pub keep_empty: bool,

    /// Run continuously, organizing on a fixed interval.
    #[arg(long)]
    pub watch: bool,

    /// Watch interval in seconds.
    #[arg(long, default_value_t = 15)]
    pub interval: u64,

    /// Path to a scan filter configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// CLI-facing spelling of the sort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortModeArg {
    /// Month buckets, YYYY-MM.
    Date,
    /// Workflow buckets inferred from names and paths.
    Source,
}

impl From<SortModeArg> for SortMode {
    fn from(arg: SortModeArg) -> Self {
        match arg {
            SortModeArg::Date => SortMode::Date,
            SortModeArg::Source => SortMode::Source,
        }
    }
}

fn default_source() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join("Downloads"))
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Runs the CLI application.
///
/// Returns `Err` only for fatal failures (bad configuration, missing
/// source, uncreatable destination); skipped files within a pass are
/// reported but do not fail the process.
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let source = cli.source.clone().unwrap_or_else(default_source);
    let destination = cli
        .destination
        .clone()
        .unwrap_or_else(|| source.join("Organized"));

    let config = ScanConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    let options = OrganizeOptions {
        sort_mode: cli.sort_mode.into(),
        dry_run: cli.dry_run,
        recursive: !cli.non_recursive,
        exclude_self: true,
        keep_empty: cli.keep_empty,
    };
    let organizer = Organizer::new(options, filters);

    if cli.watch {
        let interval = Duration::from_secs(cli.interval.max(1));
        run_watch(&organizer, &source, &destination, interval)
    } else {
        run_once(&organizer, &source, &destination, cli.dry_run)
    }
}

fn run_once(
    organizer: &Organizer,
    source: &Path,
    destination: &Path,
    dry_run: bool,
) -> Result<(), String> {
    if dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", source.display()));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", source.display()));
    }

    let spinner = OutputFormatter::create_spinner();
    let report = organizer
        .organize_with(source, destination, |action| {
            spinner.inc(1);
            if let Some(name) = action.source.file_name() {
                spinner.set_message(name.to_string_lossy().to_string());
            }
        })
        .map_err(|e| format!("Error: {}", e))?;
    spinner.finish_and_clear();

    if report.actions.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(());
    }

    for action in &report.actions {
        OutputFormatter::action_line(action);
    }
    OutputFormatter::report_summary(&report);

    if report.dry_run {
        OutputFormatter::plain("\nNo files were modified. Run again without --dry-run to apply.");
    }

    Ok(())
}

fn run_watch(
    organizer: &Organizer,
    source: &Path,
    destination: &Path,
    interval: Duration,
) -> Result<(), String> {
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| format!("Error installing Ctrl-C handler: {}", e))?;

    OutputFormatter::info(&format!(
        "Watching {} every {}s. Press Ctrl-C to stop.",
        source.display(),
        interval.as_secs()
    ));

    let stats = watcher::watch(
        organizer,
        source,
        destination,
        interval,
        &token,
        |outcome| match outcome {
            Ok(report) if report.total() > 0 => {
                OutputFormatter::plain(&format!(
                    "Cycle complete: moved={}, duplicates={}, skipped={}",
                    report.moved, report.duplicates, report.skipped
                ));
                if let Some(warning) = &report.index_warning {
                    OutputFormatter::warning(warning);
                }
            }
            Ok(_) => {}
            Err(e) => OutputFormatter::error(&format!("Pass failed: {}", e)),
        },
    );

    OutputFormatter::success(&format!(
        "Watch stopped after {} passes ({} moved, {} duplicates, {} skipped).",
        stats.passes, stats.moved, stats.duplicates, stats.skipped
    ));

    Ok(())
}

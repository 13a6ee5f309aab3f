//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status
//! lines, per-file action lines, a pass summary table, and a spinner for
//! long-running passes. The engine itself never prints; everything
//! user-visible goes through here.

use crate::engine::{ActionKind, FileAction, Report};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a spinner for a running pass.
    ///
    /// The number of candidate files is unknown until the pass finishes,
    /// so this is a ticking spinner with a live message rather than a
    /// bounded bar.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// let spinner = OutputFormatter::create_spinner();
    /// spinner.set_message("hashing photo.png");
    /// spinner.finish_and_clear();
    /// ```
    pub fn create_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {pos} processed {msg}")
                .expect("Invalid spinner template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Prints one per-file action line.
    pub fn action_line(action: &FileAction) {
        match action.kind {
            ActionKind::Moved => {
                let destination = action
                    .destination
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default();
                println!(
                    " {} {} {} {}",
                    "✓".green(),
                    action.source.display(),
                    "→".dimmed(),
                    destination
                );
            }
            ActionKind::Duplicate => {
                let destination = action
                    .destination
                    .as_ref()
                    .map(|d| d.display().to_string())
                    .unwrap_or_default();
                println!(
                    " {} {} {} {}",
                    "≡".yellow(),
                    action.source.display(),
                    "→".dimmed(),
                    destination
                );
            }
            ActionKind::Skipped => {
                let reason = action.error.as_deref().unwrap_or("unknown error");
                eprintln!(
                    " {} {}: {}",
                    "✗".red(),
                    action.source.display(),
                    reason
                );
            }
        }
    }

    /// Prints the pass summary table.
    pub fn report_summary(report: &Report) {
        Self::header(if report.dry_run {
            "DRY RUN SUMMARY"
        } else {
            "SUMMARY"
        });

        let rows = [
            ("Moved", report.moved, "✓".green()),
            ("Duplicates", report.duplicates, "≡".yellow()),
            ("Skipped", report.skipped, "✗".red()),
        ];

        for (label, count, symbol) in rows {
            let file_word = if count == 1 { "file" } else { "files" };
            println!(
                "  {} {:<10} | {} {}",
                symbol,
                label,
                count.to_string().green(),
                file_word
            );
        }

        println!("{}", "-".repeat(32));
        println!(
            "  {:<12} | {} {}",
            "Total".bold(),
            report.total().to_string().green().bold(),
            if report.total() == 1 { "file" } else { "files" }
        );

        if let Some(warning) = &report.index_warning {
            Self::warning(&format!(
                "Index could not be saved: {}. Moves are intact; the next pass re-derives missing entries.",
                warning
            ));
        }
    }
}

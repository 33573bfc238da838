// CLI output formatting with consistent styling using indicatif and colored.
// Textual output goes through println!/eprintln!; tracing is reserved for
// library diagnostics enabled with TSYNC_LOG.

use colored::Colorize as _;
use indicatif::{ProgressBar, ProgressStyle};
use miette::Diagnostic;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tsync::merge::MergeReport;

const PD_TICK: Duration = Duration::from_millis(100);

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TSYNC_LOG";

static E2E_MODE: AtomicBool = AtomicBool::new(false);

/// Enable E2E mode for deterministic output (no colors, fixed durations, hidden progress bars).
pub fn set_e2e_mode(enabled: bool) {
    E2E_MODE.store(enabled, Ordering::SeqCst);
    if enabled {
        colored::control::set_override(false);
    }
}

pub fn is_e2e() -> bool {
    E2E_MODE.load(Ordering::SeqCst)
}

fn format_duration(duration: Duration) -> String {
    if is_e2e() {
        "[DURATION]".to_string()
    } else {
        humantime::format_duration(duration).to_string()
    }
}

/// Installs a stderr subscriber filtered by `TSYNC_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!is_e2e())
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    if is_e2e() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(PD_TICK);
    pb
}

/// Prints a diagnostic with the installed miette handler without failing.
pub fn print_report<D: Diagnostic + Send + Sync + 'static>(diagnostic: D) {
    eprintln!("{:?}", miette::Report::new(diagnostic));
}

pub fn print_no_files(what: &str) {
    eprintln!("{} {}", "No files found:".yellow(), what);
}

// Extract

pub fn print_extract_header() {
    println!("{}", "TS Catalog Extractor".dimmed());
}

pub fn print_loaded_extractions(files: usize, messages: usize) {
    println!(
        "{} {} from {}",
        "Loaded".dimmed(),
        format!("{} message(s)", messages).green(),
        format!("{} file(s)", files).cyan()
    );
}

pub fn print_merged(path: &Path, report: &MergeReport, duration: Duration) {
    println!(
        "{} {} in {} ({} new, {} matched, {} revived, {} obsolete, {} removed)",
        "Merged".dimmed(),
        path.display().to_string().green(),
        format_duration(duration).green(),
        report.added.to_string().cyan(),
        report.matched,
        report.revived,
        report.obsoleted,
        report.removed
    );
    if !report.conflicts.is_empty() {
        println!(
            "  {} {} message(s) extracted more than once",
            "->".dimmed(),
            report.conflicts.len().to_string().yellow()
        );
    }
}

pub fn print_would_update(path: &Path) {
    println!("{} {}", "Would update:".yellow(), path.display());
}

pub fn print_unchanged(path: &Path) {
    println!("{} {}", "Unchanged:".dimmed(), path.display());
}

pub fn print_written(path: &Path) {
    println!("{} {}", "Written:".green(), path.display());
}

// Check

pub fn print_check_header() {
    println!("{}", "TS Catalog Checker".dimmed());
}

pub fn print_checking(path: &Path) {
    println!("{} {}", "Checking".dimmed(), path.display().to_string().green());
}

pub fn print_check_success() {
    println!("{}", "No issues found!".green());
}

// Format

pub fn print_format_header() {
    println!("{}", "TS Catalog Formatter".dimmed());
}

pub fn print_would_format(path: &Path) {
    println!("{} {}", "Would format:".yellow(), path.display());
}

pub fn print_formatted(path: &Path) {
    println!("{} {}", "Formatted:".green(), path.display());
}

pub fn print_format_dry_run_summary(count: usize) {
    println!(
        "{} {} file(s) would be formatted",
        "Dry run:".yellow(),
        count
    );
}

pub fn print_format_summary(formatted: usize, unchanged: usize) {
    println!(
        "{} {} formatted, {} unchanged",
        "Done:".green(),
        formatted,
        unchanged
    );
}

pub fn print_diff(old: &str, new: &str) {
    // Colors are suppressed in e2e mode by `colored::control::set_override(false)`.
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            println!("{}", "  ...".dimmed());
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                let line = format!("{} {}", sign, change);
                match change.tag() {
                    ChangeTag::Delete => print!("{}", line.red()),
                    ChangeTag::Insert => print!("{}", line.green()),
                    ChangeTag::Equal => print!("{}", line.dimmed()),
                }
            }
        }
    }
}

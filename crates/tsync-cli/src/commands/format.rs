//! Format command: rewrite catalogs in canonical form.
//!
//! Formatting is a parse followed by a serialize, so everything a catalog
//! holds survives and only layout, escaping and location encoding change.

use crate::commands::{
    ConfigArgs, DryRunDiff, ResolvedConfig, read_catalog, render_catalog, write_file,
};
use crate::core::{CliError, FormatError, FormatReport, MissingInputError};
use crate::utils::{collect_files, ui};
use clap::Parser;
use std::path::{Path, PathBuf};
use tsync::location::LocationMode;

/// Arguments for the format command.
#[derive(Debug, Parser)]
pub struct FormatArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Catalogs, or directories searched for `*.ts` files. Defaults to the
    /// catalogs listed in tsync.toml.
    pub catalogs: Vec<PathBuf>,

    /// How locations are written: relative, absolute or none.
    #[arg(long)]
    pub locations: Option<LocationMode>,

    /// Dry run - show what would be formatted without making changes.
    #[arg(long)]
    pub dry_run: bool,
}

/// Result of formatting a single file.
#[derive(Debug)]
pub struct FormatResult {
    /// Path to the file.
    pub path: PathBuf,
    /// Whether the file was changed.
    pub changed: bool,
    /// Error if formatting failed.
    pub error: Option<String>,
    /// Diff for dry-run mode.
    pub diff: Option<DryRunDiff>,
}

/// Run the format command.
pub fn run_format(args: FormatArgs) -> Result<(), CliError> {
    let resolved = ResolvedConfig::load(&args.config)?;
    let roots = resolved.catalogs_or(&args.catalogs);
    if roots.is_empty() {
        return Err(MissingInputError {
            what: "catalogs",
            flag: "a catalog path",
        }
        .into());
    }
    let locations = resolved.locations_or(args.locations);

    ui::print_format_header();

    let files = collect_files(&roots, "ts")?;
    let mut total_formatted = 0;
    let mut total_unchanged = 0;
    let mut errors: Vec<FormatError> = Vec::new();

    let pb = ui::create_progress_bar(files.len() as u64, "Formatting catalogs...");

    for path in &files {
        let result = format_catalog(path, locations, args.dry_run);

        if let Some(error) = result.error {
            errors.push(FormatError {
                path: result.path,
                help: error,
            });
        } else if result.changed {
            total_formatted += 1;
            pb.suspend(|| {
                if args.dry_run {
                    ui::print_would_format(&result.path);
                    if let Some(diff) = &result.diff {
                        diff.print();
                    }
                } else {
                    ui::print_formatted(&result.path);
                }
            });
        } else {
            total_unchanged += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if errors.is_empty() {
        if args.dry_run && total_formatted > 0 {
            ui::print_format_dry_run_summary(total_formatted);
        } else {
            ui::print_format_summary(total_formatted, total_unchanged);
        }
        Ok(())
    } else {
        Err(CliError::Format(FormatReport {
            formatted_count: total_formatted,
            error_count: errors.len(),
            errors,
        }))
    }
}

/// Format a single catalog.
fn format_catalog(path: &Path, locations: LocationMode, check_only: bool) -> FormatResult {
    let loaded = match read_catalog(path) {
        Ok(loaded) => loaded,
        Err(err) => {
            return FormatResult {
                path: path.to_path_buf(),
                changed: false,
                error: Some(match err {
                    CliError::CatalogParse(parse) => parse.reason,
                    other => other.to_string(),
                }),
                diff: None,
            };
        },
    };

    let formatted = render_catalog(&loaded.catalog, locations);
    if formatted == loaded.content {
        return FormatResult {
            path: path.to_path_buf(),
            changed: false,
            error: None,
            diff: None,
        };
    }

    if check_only {
        return FormatResult {
            path: path.to_path_buf(),
            changed: true,
            error: None,
            diff: Some(DryRunDiff::new(loaded.content, formatted)),
        };
    }

    let error = write_file(path, &formatted)
        .err()
        .map(|err| format!("Failed to write file: {}", err));
    FormatResult {
        path: path.to_path_buf(),
        changed: error.is_none(),
        error,
        diff: None,
    }
}

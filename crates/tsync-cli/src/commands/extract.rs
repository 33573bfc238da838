//! Extract command: merge extracted messages into catalogs.

use crate::commands::{
    ConfigArgs, DryRunDiff, LoadedCatalog, ResolvedConfig, finish_validation,
    findings_to_issues, load_extractions, read_catalog, render_catalog, write_file,
};
use crate::core::{CliError, MissingInputError};
use crate::utils::{collect_files, ui};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tsync::location::LocationMode;
use tsync::merge::{MergeOptions, merge};
use tsync::validate::validate;
use tsync::Catalog;

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Extraction files, or directories searched for `*.json` files.
    #[arg(long, num_args = 1..)]
    pub sources: Vec<PathBuf>,

    /// Catalogs to update. Catalogs that do not exist yet are created.
    #[arg(long = "catalog", num_args = 1..)]
    pub catalogs: Vec<PathBuf>,

    /// Target language written to newly created catalogs (e.g. `fr_FR`).
    #[arg(long)]
    pub language: Option<String>,

    /// How locations are written: relative, absolute or none.
    #[arg(long)]
    pub locations: Option<LocationMode>,

    /// Drop messages that are no longer extracted instead of keeping them
    /// as obsolete.
    #[arg(long)]
    pub no_obsolete: bool,

    /// Exit with an error when validation of the result finds errors.
    #[arg(long)]
    pub strict: bool,

    /// Dry run - show the changes without writing any catalog.
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the extract command.
pub fn run_extract(args: ExtractArgs) -> Result<(), CliError> {
    let resolved = ResolvedConfig::load(&args.config)?;

    let sources = resolved.sources_or(&args.sources);
    if sources.is_empty() {
        return Err(MissingInputError {
            what: "extraction sources",
            flag: "--sources",
        }
        .into());
    }
    let catalogs = resolved.catalogs_or(&args.catalogs);
    if catalogs.is_empty() {
        return Err(MissingInputError {
            what: "catalogs",
            flag: "--catalog",
        }
        .into());
    }

    let locations = resolved.locations_or(args.locations);
    let options = MergeOptions {
        no_obsolete: args.no_obsolete || resolved.config.no_obsolete,
    };
    let strict = args.strict || resolved.config.strict;
    let checks = resolved.config.checks.validation_options();

    ui::print_extract_header();

    let files = collect_files(&sources, "json")?;
    if files.is_empty() {
        return Err(MissingInputError {
            what: "extraction files",
            flag: "--sources",
        }
        .into());
    }
    let extracted = load_extractions(&files)?;
    ui::print_loaded_extractions(files.len(), extracted.len());

    let mut issues = Vec::new();
    for path in &catalogs {
        let start = Instant::now();
        let (before, old) = if path.exists() {
            let loaded = read_catalog(path)?;
            (Some(loaded.content), loaded.catalog)
        } else {
            (None, new_catalog(&args, &resolved))
        };

        let outcome = merge(old, extracted.iter().cloned(), &options);
        let rendered = render_catalog(&outcome.catalog, locations);
        ui::print_merged(path, &outcome.report, start.elapsed());

        write_or_preview(path, before, &rendered, args.dry_run)?;

        let findings = validate(&outcome.catalog, &checks);
        let merged = LoadedCatalog {
            path: path.clone(),
            content: rendered,
            catalog: outcome.catalog,
        };
        issues.extend(findings_to_issues(&merged, &findings));
    }

    finish_validation(issues, strict)
}

fn new_catalog(args: &ExtractArgs, resolved: &ResolvedConfig) -> Catalog {
    let mut catalog = Catalog::new(args.language.clone());
    catalog.source_language = resolved.config.source_language.clone();
    catalog
}

fn write_or_preview(
    path: &Path,
    before: Option<String>,
    rendered: &str,
    dry_run: bool,
) -> Result<(), CliError> {
    if before.as_deref() == Some(rendered) {
        ui::print_unchanged(path);
        return Ok(());
    }

    if dry_run {
        ui::print_would_update(path);
        DryRunDiff::new(before.unwrap_or_default(), rendered.to_string()).print();
    } else {
        write_file(path, rendered)?;
        ui::print_written(path);
    }
    Ok(())
}

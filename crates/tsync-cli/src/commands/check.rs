//! Check command: validate catalogs.

use crate::commands::{
    ConfigArgs, ResolvedConfig, finish_validation, findings_to_issues, read_catalog,
};
use crate::core::{CliError, MissingInputError};
use crate::utils::{collect_files, ui};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use tsync::validate::validate;

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Catalogs, or directories searched for `*.ts` files. Defaults to the
    /// catalogs listed in tsync.toml.
    pub catalogs: Vec<PathBuf>,

    /// Exit with an error when any catalog has validation errors.
    #[arg(long)]
    pub strict: bool,
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<(), CliError> {
    let resolved = ResolvedConfig::load(&args.config)?;
    let roots = resolved.catalogs_or(&args.catalogs);
    if roots.is_empty() {
        return Err(MissingInputError {
            what: "catalogs",
            flag: "a catalog path",
        }
        .into());
    }

    ui::print_check_header();

    let files = collect_files(&roots, "ts")?;
    if files.is_empty() {
        ui::print_no_files("no *.ts catalogs");
        return Ok(());
    }

    let checks = resolved.config.checks.validation_options();
    let pb = ui::create_progress_bar(files.len() as u64, "Checking catalogs...");

    let results: Vec<_> = files
        .par_iter()
        .map(|path| -> Result<_, CliError> {
            let loaded = read_catalog(path)?;
            let findings = validate(&loaded.catalog, &checks);
            pb.inc(1);
            Ok(findings_to_issues(&loaded, &findings))
        })
        .collect::<Result<_, _>>()?;
    pb.finish_and_clear();

    for path in &files {
        ui::print_checking(path);
    }

    let issues = results.into_iter().flatten().collect();
    finish_validation(issues, args.strict || resolved.config.strict)
}

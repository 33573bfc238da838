//! Lookup command: translate one message the way an application would.

use crate::commands::read_catalog;
use crate::core::CliError;
use clap::Parser;
use std::path::PathBuf;
use tsync::Translator;

/// Arguments for the lookup command.
#[derive(Debug, Parser)]
pub struct LookupArgs {
    /// Catalog to look the message up in.
    #[arg(long)]
    pub catalog: PathBuf,

    /// Context of the message.
    #[arg(long)]
    pub context: String,

    /// Source text of the message.
    #[arg(long)]
    pub source: String,

    /// Disambiguating comment of the message.
    #[arg(long, default_value = "")]
    pub comment: String,

    /// Count used to select a plural form and substituted for `%n`.
    #[arg(short = 'n', long = "count")]
    pub count: Option<u64>,
}

/// Run the lookup command, printing the translation to stdout.
pub fn run_lookup(args: LookupArgs) -> Result<(), CliError> {
    let loaded = read_catalog(&args.catalog)?;
    let translator = Translator::new(&loaded.catalog);
    tracing::debug!(entries = translator.len(), "translator ready");

    println!(
        "{}",
        translator.translate(&args.context, &args.source, &args.comment, args.count)
    );
    Ok(())
}

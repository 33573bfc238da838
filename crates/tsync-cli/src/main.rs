use clap::{Parser, Subcommand};
use miette::Result as MietteResult;
use tsync_cli::commands::{
    CheckArgs, ExtractArgs, FormatArgs, LookupArgs, run_check, run_extract, run_format,
    run_lookup,
};
use tsync_cli::utils::ui;

#[derive(Parser)]
#[command(name = "tsync")]
#[command(about = "Keep TS translation catalogs in sync with extracted source strings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Deterministic output for end-to-end tests.
    #[arg(long, global = true, hide = true)]
    e2e: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge extracted messages into catalogs
    Extract(ExtractArgs),

    /// Check catalogs for errors and translation problems
    Check(CheckArgs),

    /// Rewrite catalogs in canonical form
    Format(FormatArgs),

    /// Translate a single message using a catalog
    Lookup(LookupArgs),
}

fn main() -> MietteResult<()> {
    let cli = Cli::parse();
    let styled = !cli.e2e;

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(styled)
                .unicode(styled)
                .context_lines(2)
                .tab_width(4)
                .color(styled)
                .build(),
        )
    }))
    .ok();

    ui::set_e2e_mode(cli.e2e);
    ui::init_logging();

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Check(args) => run_check(args),
        Commands::Format(args) => run_format(args),
        Commands::Lookup(args) => run_lookup(args),
    };

    result.map_err(miette::Report::new)
}

//! CLI command implementations.

mod check;
mod common;
mod dry_run;
mod extract;
mod format;
mod lookup;

pub use check::{CheckArgs, run_check};
pub use common::{
    ConfigArgs, LoadedCatalog, ResolvedConfig, findings_to_issues, finish_validation,
    load_extractions, read_catalog, render_catalog, write_file,
};
pub use dry_run::DryRunDiff;
pub use extract::{ExtractArgs, run_extract};
pub use format::{FormatArgs, run_format};
pub use lookup::{LookupArgs, run_lookup};

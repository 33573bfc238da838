//! Shared functionality for CLI commands.

use crate::core::{
    CatalogNotFoundError, CatalogParseError, CliError, ConfigError, ConfigNotFoundError,
    ConfigParseError, ExtractionError, ValidationIssue, ValidationReport, span_at,
    span_from_line_col,
};
use crate::utils::ui;
use clap::Args;
use fs_err as fs;
use miette::{NamedSource, SourceSpan};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tsync::location::LocationMode;
use tsync::ts::{self, SerializeOptions};
use tsync::validate::Finding;
use tsync::{Catalog, ExtractedMessage, ParseError};
use tsync_toml::{TsyncConfig, TsyncConfigError};

/// Common arguments for locating the configuration.
#[derive(Args, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a tsync.toml file. Defaults to the nearest one above the
    /// current directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// The configuration in effect for a command.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    /// Directory relative paths in the configuration resolve against.
    pub base_dir: PathBuf,
    pub config: TsyncConfig,
}

impl ResolvedConfig {
    /// Loads `--config`, or the discovered tsync.toml, or the defaults.
    pub fn load(args: &ConfigArgs) -> Result<Self, CliError> {
        let cwd = std::env::current_dir()?;

        if let Some(path) = &args.config {
            let config =
                TsyncConfig::read_from_path(path).map_err(|err| config_error(path, err))?;
            let base_dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => cwd,
            };
            return Ok(Self { base_dir, config });
        }

        match TsyncConfig::discover(&cwd) {
            Ok(Some((base_dir, config))) => {
                tracing::debug!(dir = %base_dir.display(), "using discovered tsync.toml");
                Ok(Self { base_dir, config })
            },
            Ok(None) => Ok(Self {
                base_dir: cwd,
                config: TsyncConfig::default(),
            }),
            Err(err) => {
                let path = discovered_path(&cwd);
                Err(config_error(&path, err))
            },
        }
    }

    /// Catalogs from the command line, or else from the configuration.
    pub fn catalogs_or(&self, explicit: &[PathBuf]) -> Vec<PathBuf> {
        if explicit.is_empty() {
            self.config.catalogs_from_base(&self.base_dir)
        } else {
            explicit.to_vec()
        }
    }

    /// Extraction sources from the command line, or else from the configuration.
    pub fn sources_or(&self, explicit: &[PathBuf]) -> Vec<PathBuf> {
        if explicit.is_empty() {
            self.config.sources_from_base(&self.base_dir)
        } else {
            explicit.to_vec()
        }
    }

    pub fn locations_or(&self, explicit: Option<LocationMode>) -> LocationMode {
        explicit.unwrap_or(self.config.locations)
    }
}

fn discovered_path(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .map(|dir| dir.join(tsync_toml::CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| cwd.join(tsync_toml::CONFIG_FILE_NAME))
}

fn config_error(path: &Path, err: TsyncConfigError) -> CliError {
    match err {
        TsyncConfigError::NotFound => ConfigNotFoundError {
            path: path.to_path_buf(),
        }
        .into(),
        TsyncConfigError::ReadError(err) => CliError::Io(err),
        TsyncConfigError::ParseError(err) => {
            let content = fs::read_to_string(path).unwrap_or_default();
            ConfigParseError {
                src: NamedSource::new(path.display().to_string(), content),
                span: err.span().map(SourceSpan::from),
                help: err.message().to_string(),
            }
            .into()
        },
        err @ TsyncConfigError::InvalidLanguageIdentifier { .. } => ConfigError {
            path: path.to_path_buf(),
            help: err.to_string(),
        }
        .into(),
    }
}

/// A catalog read from disk, with the text it was parsed from.
#[derive(Clone, Debug)]
pub struct LoadedCatalog {
    pub path: PathBuf,
    pub content: String,
    pub catalog: Catalog,
}

/// Reads and parses the catalog at `path`.
pub fn read_catalog(path: &Path) -> Result<LoadedCatalog, CliError> {
    if !path.exists() {
        return Err(CatalogNotFoundError {
            path: path.to_path_buf(),
        }
        .into());
    }

    let bytes = fs::read(path)?;
    match ts::parse(&bytes) {
        Ok(catalog) => Ok(LoadedCatalog {
            path: path.to_path_buf(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
            catalog,
        }),
        Err(err) => Err(parse_error(path, &bytes, &err).into()),
    }
}

fn parse_error(path: &Path, bytes: &[u8], err: &ParseError) -> CatalogParseError {
    let content = String::from_utf8_lossy(bytes).into_owned();
    let span = err.position().map(|position| span_at(&content, position));
    let help = match err {
        ParseError::Encoding(_) => "Catalogs must be encoded as UTF-8",
        ParseError::MissingVersion { .. } | ParseError::UnsupportedVersion { .. } => {
            "The <TS> element needs version=\"2.0\" or version=\"2.1\""
        },
        ParseError::Location { .. } => {
            "A location without a filename must follow one that names a file"
        },
        _ => "Fix the catalog by hand or restore it from version control",
    };
    CatalogParseError {
        src: NamedSource::new(path.display().to_string(), content),
        span,
        reason: err.to_string(),
        help: help.to_string(),
    }
}

/// Renders `catalog` in canonical form.
pub fn render_catalog(catalog: &Catalog, locations: LocationMode) -> String {
    ts::serialize_with(catalog, &SerializeOptions { locations })
}

/// Writes `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Reads extraction files in parallel, concatenating their messages in
/// file order.
pub fn load_extractions(files: &[PathBuf]) -> Result<Vec<ExtractedMessage>, CliError> {
    let batches = files
        .par_iter()
        .map(|path| read_extraction(path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(batches.into_iter().flatten().collect())
}

fn read_extraction(path: &Path) -> Result<Vec<ExtractedMessage>, CliError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|err| {
        let span = span_from_line_col(&content, err.line(), err.column(), 1);
        ExtractionError {
            message: err.to_string(),
            src: NamedSource::new(path.display().to_string(), content),
            span: Some(span),
        }
        .into()
    })
}

/// Converts findings on a loaded catalog into diagnostics.
pub fn findings_to_issues(loaded: &LoadedCatalog, findings: &[Finding]) -> Vec<ValidationIssue> {
    findings
        .iter()
        .map(|finding| ValidationIssue::from_finding(&loaded.path, &loaded.content, finding))
        .collect()
}

/// Prints or fails on the collected validation issues.
///
/// In strict mode a report holding errors becomes the command's error;
/// otherwise it is printed and the command succeeds.
pub fn finish_validation(issues: Vec<ValidationIssue>, strict: bool) -> Result<(), CliError> {
    if issues.is_empty() {
        ui::print_check_success();
        return Ok(());
    }

    let report = ValidationReport::from_issues(issues);
    if strict && report.error_count > 0 {
        return Err(report.into());
    }
    ui::print_report(report);
    Ok(())
}

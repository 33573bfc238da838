//! CLI error types using miette for Rust-style diagnostics.
//!
//! These error types carry source snippets, labels, and help text.

// Fields in these structs are read by miette's Diagnostic derive macro
#![allow(unused)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tsync::ts::escape_text;
use tsync::validate::{Finding, Severity};

/// Error when a `--config` file does not exist.
#[derive(Debug, Diagnostic, Error)]
#[error("configuration file not found: {}", path.display())]
#[diagnostic(
    code(tsync::config::not_found),
    help(
        "Create a tsync.toml file with, for example:\n\n  \
          catalogs = [\"i18n/app_fr.ts\"]\n  \
          sources = [\"build/extracted\"]\n"
    )
)]
pub struct ConfigNotFoundError {
    /// The path where the config was expected.
    pub path: PathBuf,
}

/// Error when parsing the tsync.toml configuration file.
#[derive(Debug, Diagnostic, Error)]
#[error("failed to parse tsync.toml configuration")]
#[diagnostic(code(tsync::config::parse_error))]
pub struct ConfigParseError {
    /// The source content of the config file.
    #[source_code]
    pub src: NamedSource<String>,

    /// The span where the error occurred.
    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    /// The underlying parse error message.
    #[help]
    pub help: String,
}

/// Error when the configuration is readable but unusable.
#[derive(Debug, Diagnostic, Error)]
#[error("invalid configuration in {}", path.display())]
#[diagnostic(code(tsync::config::invalid))]
pub struct ConfigError {
    pub path: PathBuf,

    #[help]
    pub help: String,
}

/// Error when a catalog file cannot be parsed.
#[derive(Debug, Diagnostic, Error)]
#[error("failed to parse catalog")]
#[diagnostic(code(tsync::catalog::parse_error))]
pub struct CatalogParseError {
    /// The source content of the catalog.
    #[source_code]
    pub src: NamedSource<String>,

    /// Where parsing stopped.
    #[label("{reason}")]
    pub span: Option<SourceSpan>,

    /// Short description used as the label.
    pub reason: String,

    #[help]
    pub help: String,
}

/// Error when a catalog that must exist does not.
#[derive(Debug, Diagnostic, Error)]
#[error("catalog not found: {}", path.display())]
#[diagnostic(
    code(tsync::catalog::not_found),
    help("Run `tsync extract` to create the catalog first")
)]
pub struct CatalogNotFoundError {
    pub path: PathBuf,
}

/// Error when an extraction file is not valid extraction JSON.
#[derive(Debug, Diagnostic, Error)]
#[error("failed to read extraction file")]
#[diagnostic(
    code(tsync::extract::invalid_source),
    help("Expected a JSON array of {{ \"context\", \"source\", \"comment\", \"numerus\", \"locations\" }} objects: {message}")
)]
pub struct ExtractionError {
    #[source_code]
    pub src: NamedSource<String>,

    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    pub message: String,
}

/// Error when there is nothing to operate on.
#[derive(Debug, Diagnostic, Error)]
#[error("no {what} given")]
#[diagnostic(
    code(tsync::input::missing),
    help("Pass {flag} or list {what} in tsync.toml")
)]
pub struct MissingInputError {
    pub what: &'static str,
    pub flag: &'static str,
}

/// A validation finding with error severity.
#[derive(Debug, Diagnostic, Error)]
#[error("{kind} ({key})")]
#[diagnostic(code(tsync::validate::error), severity(Error))]
pub struct CatalogValidationError {
    /// The source content of the catalog.
    #[source_code]
    pub src: NamedSource<String>,

    /// The `<source>` element of the message, when it can be located.
    #[label("this message")]
    pub span: Option<SourceSpan>,

    pub kind: String,

    /// `context/"source"` of the message.
    pub key: String,
}

/// A validation finding with warning severity.
#[derive(Debug, Diagnostic, Error)]
#[error("{kind} ({key})")]
#[diagnostic(code(tsync::validate::warning), severity(Warning))]
pub struct CatalogValidationWarning {
    #[source_code]
    pub src: NamedSource<String>,

    #[label("this message")]
    pub span: Option<SourceSpan>,

    pub kind: String,

    pub key: String,
}

/// Aggregated validation report containing multiple issues.
#[derive(Debug, Diagnostic, Error)]
#[error("validation found {error_count} error(s) and {warning_count} warning(s)")]
#[diagnostic(code(tsync::validate::report))]
pub struct ValidationReport {
    /// Number of errors found.
    pub error_count: usize,

    /// Number of warnings found.
    pub warning_count: usize,

    /// Related diagnostics.
    #[related]
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Builds a report from issues, counting severities and sorting them.
    pub fn from_issues(mut issues: Vec<ValidationIssue>) -> Self {
        issues.sort_by_cached_key(|issue| issue.sort_key());
        let error_count = issues
            .iter()
            .filter(|issue| matches!(issue, ValidationIssue::Error(_)))
            .count();
        Self {
            error_count,
            warning_count: issues.len() - error_count,
            issues,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A validation issue (either error or warning).
#[derive(Debug, Diagnostic, Error)]
pub enum ValidationIssue {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Error(#[from] CatalogValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Warning(#[from] CatalogValidationWarning),
}

impl ValidationIssue {
    /// Converts a finding on the catalog at `path` with text `content`.
    pub fn from_finding(path: &Path, content: &str, finding: &Finding) -> Self {
        let src = NamedSource::new(path.display().to_string(), content.to_string());
        let span = find_message_span(content, &finding.context, &finding.source);
        let kind = finding.kind.to_string();
        let key = finding.key().to_string();
        match finding.severity {
            Severity::Error => ValidationIssue::Error(CatalogValidationError {
                src,
                span,
                kind,
                key,
            }),
            Severity::Warning => ValidationIssue::Warning(CatalogValidationWarning {
                src,
                span,
                kind,
                key,
            }),
        }
    }

    /// Get a sort key for deterministic ordering of issues.
    ///
    /// Errors sort before warnings; within a severity, by file then key.
    pub fn sort_key(&self) -> String {
        match self {
            ValidationIssue::Error(e) => format!("1:{}:{}", e.src.name(), e.key),
            ValidationIssue::Warning(e) => format!("2:{}:{}", e.src.name(), e.key),
        }
    }
}

/// Error when formatting fails for a catalog.
#[derive(Debug, Diagnostic, Error)]
#[error("failed to format {}", path.display())]
#[diagnostic(code(tsync::format::failed))]
pub struct FormatError {
    /// The path to the file.
    pub path: PathBuf,

    /// The underlying error.
    #[help]
    pub help: String,
}

/// Report for format command results.
#[derive(Debug, Diagnostic, Error)]
#[error("formatted {formatted_count} file(s), {error_count} error(s)")]
#[diagnostic(code(tsync::format::report))]
pub struct FormatReport {
    /// Number of files formatted.
    pub formatted_count: usize,

    /// Number of errors.
    pub error_count: usize,

    /// Related format errors.
    #[related]
    pub errors: Vec<FormatError>,
}

#[derive(Debug, Diagnostic, Error)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigNotFound(#[from] ConfigNotFoundError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigParse(#[from] ConfigParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    CatalogParse(#[from] CatalogParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    CatalogNotFound(#[from] CatalogNotFoundError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    MissingInput(#[from] MissingInputError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationReport),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatReport),

    #[error("IO error: {0}")]
    #[diagnostic(code(tsync::io))]
    Io(#[from] std::io::Error),
}

/// Calculate SourceSpan from a 1-based line and column in source text.
pub fn span_from_line_col(source: &str, line: usize, col: usize, len: usize) -> SourceSpan {
    let mut offset = 0;
    for (i, line_content) in source.lines().enumerate() {
        if i + 1 == line {
            offset += col.saturating_sub(1);
            break;
        }
        offset += line_content.len() + 1; // +1 for newline
    }
    SourceSpan::new(offset.min(source.len()).into(), len)
}

/// Span of a byte offset, clamped to the source.
pub fn span_at(source: &str, offset: u64) -> SourceSpan {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX).min(source.len());
    SourceSpan::new(offset.into(), 0)
}

/// Find the `<source>` element of a message in a catalog's text.
///
/// Only the first context named `context` is searched; text is matched in
/// its escaped form.
pub fn find_message_span(content: &str, context: &str, source: &str) -> Option<SourceSpan> {
    let name = format!("<name>{}</name>", escape_text(context));
    let context_start = content.find(&name)?;
    let context_end = content[context_start..]
        .find("</context>")
        .map_or(content.len(), |end| context_start + end);

    let element = format!("<source>{}</source>", escape_text(source));
    let found = content[context_start..context_end].find(&element)?;
    Some(SourceSpan::new(
        (context_start + found).into(),
        element.len(),
    ))
}

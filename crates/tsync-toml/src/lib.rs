#![doc = include_str!("../README.md")]

use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tsync::location::LocationMode;
use tsync::validate::ValidationOptions;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// Name of the configuration file looked up by [`TsyncConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "tsync.toml";

#[derive(Debug, Error)]
pub enum TsyncConfigError {
    /// Configuration file not found.
    #[error("tsync.toml configuration file not found")]
    NotFound,
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The configured source language is not a valid language identifier.
    #[error("Invalid source language identifier '{name}'")]
    InvalidLanguageIdentifier {
        /// The invalid identifier.
        name: String,
        /// The parsing error produced by `unic-langid`.
        #[source]
        source: LanguageIdentifierError,
    },
}

/// The `[checks]` table: switches for the translation-quality checks.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecksConfig {
    /// Report `%1`..`%99` markers missing from a translation.
    pub placemarkers: bool,
    /// Report `&` accelerators present on one side only.
    pub accelerators: bool,
    /// Report translations that drop the source's ending punctuation.
    pub punctuation: bool,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            placemarkers: true,
            accelerators: true,
            punctuation: true,
        }
    }
}

impl ChecksConfig {
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            placemarkers: self.placemarkers,
            accelerators: self.accelerators,
            punctuation: self.punctuation,
        }
    }
}

/// The configuration for `tsync`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TsyncConfig {
    /// Language of the source strings, written as `sourcelanguage` on new
    /// catalogs (e.g. "en").
    #[serde(default)]
    pub source_language: Option<String>,
    /// How locations are written to catalogs.
    #[serde(default)]
    pub locations: LocationMode,
    /// Drop messages that are no longer extracted instead of marking them
    /// obsolete.
    #[serde(default)]
    pub no_obsolete: bool,
    /// Fail when validation reports errors.
    #[serde(default)]
    pub strict: bool,
    /// Catalog files (or directories of catalogs) to operate on.
    #[serde(default)]
    pub catalogs: Vec<PathBuf>,
    /// Extraction files (or directories of them) fed to `extract`.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub checks: ChecksConfig,
}

impl TsyncConfig {
    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, TsyncConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TsyncConfigError::NotFound);
        }

        let content = fs::read_to_string(path)?;
        let config: TsyncConfig = toml::from_str(&content)?;
        config.source_language_identifier()?;

        Ok(config)
    }

    /// Finds `tsync.toml` in `start` or the nearest parent directory.
    ///
    /// Returns the directory holding the file together with the parsed
    /// configuration, or `None` when no file exists.
    pub fn discover(start: &Path) -> Result<Option<(PathBuf, Self)>, TsyncConfigError> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                let config = Self::read_from_path(&candidate)?;
                return Ok(Some((dir.to_path_buf(), config)));
            }
        }
        Ok(None)
    }

    /// Returns the configured source language as a `LanguageIdentifier`.
    pub fn source_language_identifier(
        &self,
    ) -> Result<Option<LanguageIdentifier>, TsyncConfigError> {
        let Some(name) = &self.source_language else {
            return Ok(None);
        };
        name.replace('_', "-")
            .parse::<LanguageIdentifier>()
            .map(Some)
            .map_err(|source| TsyncConfigError::InvalidLanguageIdentifier {
                name: name.clone(),
                source,
            })
    }

    /// Catalog paths resolved against `base_dir`.
    pub fn catalogs_from_base(&self, base_dir: &Path) -> Vec<PathBuf> {
        resolve_all(base_dir, &self.catalogs)
    }

    /// Extraction source paths resolved against `base_dir`.
    pub fn sources_from_base(&self, base_dir: &Path) -> Vec<PathBuf> {
        resolve_all(base_dir, &self.sources)
    }
}

fn resolve_all(base_dir: &Path, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().map(|path| base_dir.join(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_from_path_success() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tsync.toml");

        let config_content = r#"
source_language = "en"
locations = "absolute"
no_obsolete = true
catalogs = ["i18n/app_fr.ts"]
sources = ["build/extracted"]

[checks]
punctuation = false
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = TsyncConfig::read_from_path(&config_path).unwrap();
        assert_eq!(config.source_language.as_deref(), Some("en"));
        assert_eq!(config.locations, LocationMode::Absolute);
        assert!(config.no_obsolete);
        assert!(!config.strict);
        assert_eq!(config.catalogs, vec![PathBuf::from("i18n/app_fr.ts")]);
        assert_eq!(config.checks, ChecksConfig {
            placemarkers: true,
            accelerators: true,
            punctuation: false,
        });
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tsync.toml");
        fs::write(&config_path, "").unwrap();

        let config = TsyncConfig::read_from_path(&config_path).unwrap();
        assert_eq!(config, TsyncConfig::default());
        assert_eq!(config.checks.validation_options(), ValidationOptions::default());
    }

    #[test]
    fn test_read_from_path_file_not_found() {
        let non_existent_path = Path::new("/non/existent/path/tsync.toml");
        let result = TsyncConfig::read_from_path(non_existent_path);
        assert!(matches!(result, Err(TsyncConfigError::NotFound)));
    }

    #[rstest]
    #[case("unknown_key = 1")]
    #[case("locations = \"sideways\"")]
    #[case("[checks]\nspelling = true")]
    #[case("catalogs = \"not-a-list.ts\"")]
    fn test_read_from_path_invalid_toml(#[case] content: &str) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tsync.toml");
        fs::write(&config_path, content).unwrap();

        let result = TsyncConfig::read_from_path(&config_path);
        assert!(matches!(result, Err(TsyncConfigError::ParseError(_))));
    }

    #[rstest]
    #[case("en", Some("en"))]
    #[case("pt_BR", Some("pt-BR"))]
    fn test_source_language_identifier(#[case] name: &str, #[case] expected: Option<&str>) {
        let config = TsyncConfig {
            source_language: Some(name.to_string()),
            ..Default::default()
        };
        let lang = config.source_language_identifier().unwrap();
        assert_eq!(lang.map(|lang| lang.to_string()).as_deref(), expected);
    }

    #[test]
    fn test_source_language_identifier_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tsync.toml");
        fs::write(&config_path, "source_language = \"invalid-lang!\"").unwrap();

        let result = TsyncConfig::read_from_path(&config_path);
        assert!(matches!(
            result,
            Err(TsyncConfigError::InvalidLanguageIdentifier { name, .. })
                if name == "invalid-lang!"
        ));
    }

    #[test]
    fn test_discover_walks_up_parents() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let nested = root.join("src").join("widgets");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("tsync.toml"), "catalogs = [\"i18n/app_de.ts\"]").unwrap();

        let (dir, config) = TsyncConfig::discover(&nested).unwrap().unwrap();
        assert_eq!(dir, root);
        assert_eq!(config.catalogs_from_base(&dir), vec![root.join("i18n/app_de.ts")]);
    }

    #[test]
    fn test_discover_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a");
        fs::create_dir_all(&nested).unwrap();
        // A tsync.toml further up (outside the temp dir) would be found too,
        // so only assert that lookup does not fail.
        assert!(TsyncConfig::discover(&nested).is_ok());
    }
}

mod common;

use common::{catalog, finished, message};
use tsync::merge::{MergeOptions, merge};
use tsync::model::{Location, Status, Translation};
use tsync::validate::{FindingKind, Severity, ValidationOptions, validate};

fn kinds(catalog: &tsync::Catalog) -> Vec<FindingKind> {
    validate(catalog, &ValidationOptions::default())
        .into_iter()
        .map(|finding| finding.kind)
        .collect()
}

#[test]
fn test_clean_catalog_has_no_findings() {
    let mut open = finished("&Open %1...", "&Ouvrir %1...");
    open.locations = vec![Location::file_line("../../src/main.cpp", 4)];
    let catalog = catalog("fr_FR", vec![
        ("A", open),
        ("A", message(
            "%n file(s)",
            Translation::Plural(vec!["%n fichier".to_string(), "%n fichiers".to_string()]),
            Status::Finished,
        )),
        ("A", finished("", "")),
    ]);
    assert!(validate(&catalog, &ValidationOptions::default()).is_empty());
}

#[test]
fn test_duplicate_key_is_an_error() {
    let catalog = catalog("de", vec![
        ("A", finished("Save", "Speichern")),
        ("A", finished("Save", "Sichern")),
        ("B", finished("Save", "Speichern")),
    ]);
    let findings = validate(&catalog, &ValidationOptions::default());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::DuplicateKey);
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(findings[0].context, "A");
}

#[test]
fn test_plural_form_count_uses_catalog_language() {
    let forms = Translation::Plural(vec!["a".to_string(), "b".to_string()]);
    let russian = catalog("ru_RU", vec![("A", message("%n", forms.clone(), Status::Finished))]);
    assert_eq!(kinds(&russian), vec![FindingKind::PluralFormCount {
        expected: 3,
        found: 2
    }]);

    let german = catalog("de_DE", vec![("A", message("%n", forms, Status::Finished))]);
    assert!(kinds(&german).is_empty());
}

#[test]
fn test_empty_finished_translation() {
    let catalog = catalog("de", vec![
        ("A", finished("Quit", "")),
        ("A", message("Later", Translation::Single(String::new()), Status::Unfinished)),
        ("A", message("%n", Translation::Plural(vec![String::new(); 2]), Status::Finished)),
    ]);
    assert_eq!(kinds(&catalog), vec![
        FindingKind::EmptyFinishedTranslation,
        FindingKind::EmptyFinishedTranslation,
    ]);
}

#[test]
fn test_absolute_location_is_a_warning() {
    let mut quit = finished("Quit", "Beenden");
    quit.locations = vec![
        Location::file_line("/home/dev/src/main.cpp", 1),
        Location::file_line("/home/dev/src/main.cpp", 9),
        Location::file_line("src/ok.cpp", 2),
    ];
    let findings = validate(&catalog("de", vec![("A", quit)]), &ValidationOptions::default());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Warning);
    assert_eq!(findings[0].kind, FindingKind::AbsoluteLocation {
        file: "/home/dev/src/main.cpp".to_string()
    });
}

#[test]
fn test_translation_quality_checks() {
    let catalog = catalog("de", vec![
        ("A", finished("Copy %1 to %2", "Kopiere nach %2")),
        ("A", finished("&File", "Datei")),
        ("A", finished("Are you sure?", "Sind Sie sicher")),
    ]);
    assert_eq!(kinds(&catalog), vec![
        FindingKind::PlaceMarkerMismatch {
            missing: vec!["%1".to_string()]
        },
        FindingKind::AcceleratorMismatch,
        FindingKind::PunctuationMismatch,
    ]);

    let quiet = ValidationOptions {
        placemarkers: false,
        accelerators: false,
        punctuation: false,
    };
    assert!(validate(&catalog, &quiet).is_empty());
}

#[test]
fn test_quality_checks_skip_obsolete_and_empty() {
    let catalog = catalog("de", vec![
        ("A", message("Copy %1", Translation::Single("Kopie".to_string()), Status::Obsolete)),
        ("A", message("Copy %1", Translation::Single(String::new()), Status::Unfinished)),
    ]);
    assert!(
        validate(&catalog, &ValidationOptions::default())
            .iter()
            .all(|finding| finding.kind == FindingKind::DuplicateKey)
    );
}

#[test]
fn test_merge_output_validates_cleanly() {
    let old = catalog("pl_PL", Vec::new());
    let outcome = merge(
        old,
        [
            tsync::ExtractedMessage::new("A", "%n files").with_numerus(true),
            tsync::ExtractedMessage::new("A", "Open"),
        ],
        &MergeOptions::default(),
    );
    assert!(validate(&outcome.catalog, &ValidationOptions::default()).is_empty());
}

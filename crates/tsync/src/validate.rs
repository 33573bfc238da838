//! Read-only consistency checks over a catalog.

use crate::model::{Catalog, Message, MessageKey, Status};
use crate::plural;
use std::collections::HashSet;
use strum::Display;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FindingKind {
    #[error("duplicate message key")]
    DuplicateKey,
    #[error("expected {expected} plural forms, found {found}")]
    PluralFormCount { expected: usize, found: usize },
    #[error("finished message has an empty translation")]
    EmptyFinishedTranslation,
    #[error("absolute location path '{file}'")]
    AbsoluteLocation { file: String },
    #[error("translation is missing place markers {}", .missing.join(", "))]
    PlaceMarkerMismatch { missing: Vec<String> },
    #[error("accelerator present in only one of source and translation")]
    AcceleratorMismatch,
    #[error("translation does not end with punctuation like the source")]
    PunctuationMismatch,
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::DuplicateKey
            | FindingKind::PluralFormCount { .. }
            | FindingKind::EmptyFinishedTranslation => Severity::Error,
            FindingKind::AbsoluteLocation { .. }
            | FindingKind::PlaceMarkerMismatch { .. }
            | FindingKind::AcceleratorMismatch
            | FindingKind::PunctuationMismatch => Severity::Warning,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub context: String,
    pub source: String,
    pub comment: String,
    pub kind: FindingKind,
}

impl Finding {
    fn new(context: &str, message: &Message, kind: FindingKind) -> Self {
        Self {
            severity: kind.severity(),
            context: context.to_string(),
            source: message.source.clone(),
            comment: message.comment.clone(),
            kind,
        }
    }

    pub fn key(&self) -> MessageKey<'_> {
        MessageKey {
            context: &self.context,
            source: &self.source,
            comment: &self.comment,
        }
    }
}

/// Switches for the translation-quality checks. Structural checks always run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValidationOptions {
    pub placemarkers: bool,
    pub accelerators: bool,
    pub punctuation: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            placemarkers: true,
            accelerators: true,
            punctuation: true,
        }
    }
}

/// Runs every check over `catalog`. Findings come in catalog order.
pub fn validate(catalog: &Catalog, options: &ValidationOptions) -> Vec<Finding> {
    let rule = plural::rule_for(catalog.language.as_deref());
    let mut findings = Vec::new();

    for context in catalog.contexts() {
        let mut seen = HashSet::new();
        for message in &context.messages {
            let mut report = |kind| findings.push(Finding::new(&context.name, message, kind));

            if !seen.insert(message.id()) {
                report(FindingKind::DuplicateKey);
            }

            if message.is_numerus() {
                let found = message.translation.forms().len();
                if found != rule.forms() {
                    report(FindingKind::PluralFormCount {
                        expected: rule.forms(),
                        found,
                    });
                }
            }

            if message.status == Status::Finished
                && !message.source.is_empty()
                && message.translation.is_empty()
            {
                report(FindingKind::EmptyFinishedTranslation);
            }

            let mut absolute: Vec<&str> = message
                .locations
                .iter()
                .filter_map(|location| location.file())
                .filter(|file| is_absolute_path(file))
                .collect();
            absolute.dedup();
            for file in absolute {
                report(FindingKind::AbsoluteLocation {
                    file: file.to_string(),
                });
            }

            if !message.status.is_live() {
                continue;
            }
            for kind in quality_findings(message, options) {
                report(kind);
            }
        }
    }
    findings
}

fn quality_findings(message: &Message, options: &ValidationOptions) -> Vec<FindingKind> {
    let forms: Vec<&str> = message
        .translation
        .forms()
        .iter()
        .map(String::as_str)
        .filter(|form| !form.is_empty())
        .collect();
    if forms.is_empty() {
        return Vec::new();
    }

    let mut kinds = Vec::new();
    if options.placemarkers {
        let expected = place_markers(&message.source);
        let mut missing: Vec<String> = Vec::new();
        for form in &forms {
            let present = place_markers(form);
            for marker in &expected {
                if !present.contains(marker) && !missing.contains(marker) {
                    missing.push(marker.clone());
                }
            }
        }
        if !missing.is_empty() {
            missing.sort_by_key(|marker| marker[1..].parse::<u32>().unwrap_or(0));
            kinds.push(FindingKind::PlaceMarkerMismatch { missing });
        }
    }

    if options.accelerators {
        let expected = has_accelerator(&message.source);
        if forms.iter().any(|form| has_accelerator(form) != expected) {
            kinds.push(FindingKind::AcceleratorMismatch);
        }
    }

    if options.punctuation
        && ends_with_punctuation(&message.source)
        && forms.iter().any(|form| !ends_with_punctuation(form))
    {
        kinds.push(FindingKind::PunctuationMismatch);
    }
    kinds
}

fn is_absolute_path(file: &str) -> bool {
    let bytes = file.as_bytes();
    file.starts_with('/')
        || file.starts_with('\\')
        || (bytes.len() >= 3
            && bytes[0].is_ascii_alphabetic()
            && bytes[1] == b':'
            && matches!(bytes[2], b'/' | b'\\'))
}

/// `%1`..`%99` markers (with optional `L` modifier), normalized to `%N`.
fn place_markers(text: &str) -> Vec<String> {
    let mut markers = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if ch != '%' {
            continue;
        }
        if chars.peek().is_some_and(|&(_, c)| c == 'L') {
            chars.next();
        }
        let mut digits = String::new();
        while digits.len() < 2 {
            match chars.peek() {
                Some(&(_, c)) if c.is_ascii_digit() => {
                    digits.push(c);
                    chars.next();
                },
                _ => break,
            }
        }
        match digits.parse::<u32>() {
            Ok(n) if n > 0 => {
                let marker = format!("%{n}");
                if !markers.contains(&marker) {
                    markers.push(marker);
                }
            },
            _ => {},
        }
    }
    markers
}

fn has_accelerator(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            continue;
        }
        match chars.peek() {
            Some('&') => {
                chars.next();
            },
            Some(c) if c.is_alphanumeric() => return true,
            _ => {},
        }
    }
    false
}

fn ends_with_punctuation(text: &str) -> bool {
    matches!(
        text.trim_end().chars().last(),
        Some('.' | ':' | '?' | '!' | '…' | '。' | '：' | '？' | '！')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_markers() {
        assert_eq!(place_markers("%1 of %L2, %1 again"), vec!["%1", "%2"]);
        assert_eq!(place_markers("100% sure, %n items"), Vec::<String>::new());
        assert_eq!(place_markers("%123"), vec!["%12"]);
    }

    #[test]
    fn test_accelerators() {
        assert!(has_accelerator("&Open"));
        assert!(!has_accelerator("Tom && Jerry"));
        assert!(!has_accelerator("a & b"));
    }

    #[test]
    fn test_absolute_paths() {
        assert!(is_absolute_path("/usr/src/main.cpp"));
        assert!(is_absolute_path("C:\\src\\main.cpp"));
        assert!(is_absolute_path("d:/src/main.cpp"));
        assert!(!is_absolute_path("../../src/main.cpp"));
        assert!(!is_absolute_path("main.cpp"));
    }

    #[test]
    fn test_punctuation() {
        assert!(ends_with_punctuation("Save as... "));
        assert!(ends_with_punctuation("本当ですか？"));
        assert!(!ends_with_punctuation("Save"));
    }
}

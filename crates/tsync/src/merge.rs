//! Reconciles a fresh extraction with an existing catalog.
//!
//! Translations, comments and statuses of messages that are still extracted
//! are kept, their locations replaced. Messages that disappeared are kept as
//! [`Status::Obsolete`] so their translations can be reused, unless
//! [`MergeOptions::no_obsolete`] is set.

use crate::model::{Catalog, Context, Location, Message, MessageKey, Status, Translation};
use crate::plural;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// One message as handed over by an extractor.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ExtractedMessage {
    pub context: String,
    pub source: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub numerus: bool,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl ExtractedMessage {
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_numerus(mut self, numerus: bool) -> Self {
        self.numerus = numerus;
        self
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MergeOptions {
    /// Drop messages that are no longer extracted instead of keeping them as
    /// obsolete.
    pub no_obsolete: bool,
}

/// The same key was extracted more than once. The locations of the later
/// occurrence were appended to the first one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MergeConflictWarning {
    pub context: String,
    pub source: String,
    pub comment: String,
    /// Locations of the repeated occurrence.
    pub locations: Vec<Location>,
}

impl MergeConflictWarning {
    pub fn key(&self) -> MessageKey<'_> {
        MessageKey {
            context: &self.context,
            source: &self.source,
            comment: &self.comment,
        }
    }
}

impl fmt::Display for MergeConflictWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message {} was extracted more than once", self.key())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MergeReport {
    /// Messages that were not in the old catalog.
    pub added: usize,
    /// Messages found in both the old catalog and the extraction.
    pub matched: usize,
    /// Matched messages that were obsolete or vanished and are live again.
    pub revived: usize,
    /// Live messages that disappeared from the extraction.
    pub obsoleted: usize,
    /// Messages dropped because of [`MergeOptions::no_obsolete`].
    pub removed: usize,
    pub conflicts: Vec<MergeConflictWarning>,
}

impl MergeReport {
    /// Whether the merge changed which messages are live.
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.revived > 0 || self.obsoleted > 0 || self.removed > 0
    }
}

#[derive(Clone, Debug)]
pub struct MergeOutcome {
    pub catalog: Catalog,
    pub report: MergeReport,
}

type Key = (String, String, String);

enum Slot {
    /// Index into `Merger::pending`.
    Pending(usize),
    Live { context: usize, message: usize },
}

/// Streaming merge: the old catalog is indexed once, extracted messages are
/// pushed one at a time.
pub struct Merger {
    options: MergeOptions,
    version: String,
    language: Option<String>,
    source_language: Option<String>,
    dependencies: Vec<String>,
    plural_forms: usize,
    /// Old messages not matched yet, in old catalog order.
    pending: Vec<Option<(String, Message)>>,
    slots: HashMap<Key, Slot>,
    contexts: Vec<Context>,
    context_index: HashMap<String, usize>,
    report: MergeReport,
}

impl Merger {
    pub fn new(mut old: Catalog, options: MergeOptions) -> Self {
        let plural_forms = plural::rule_for(old.language.as_deref()).forms();
        let mut merger = Self {
            options,
            version: std::mem::take(&mut old.version),
            language: old.language.take(),
            source_language: old.source_language.take(),
            dependencies: std::mem::take(&mut old.dependencies),
            plural_forms,
            pending: Vec::with_capacity(old.message_count()),
            slots: HashMap::with_capacity(old.message_count()),
            contexts: Vec::with_capacity(old.contexts().len()),
            context_index: HashMap::with_capacity(old.contexts().len()),
            report: MergeReport::default(),
        };

        for context in old.into_contexts() {
            let slot = merger.context_slot(&context.name);
            if context.comment.is_some() {
                merger.contexts[slot].comment = context.comment;
            }
            for message in context.messages {
                let key = (
                    context.name.clone(),
                    message.source.clone(),
                    message.comment.clone(),
                );
                let index = merger.pending.len();
                if merger.slots.contains_key(&key) {
                    tracing::warn!(
                        context = %key.0,
                        source = %key.1,
                        "duplicate message in existing catalog; keeping it unmatched"
                    );
                } else {
                    merger.slots.insert(key, Slot::Pending(index));
                }
                merger.pending.push(Some((context.name.clone(), message)));
            }
        }
        merger
    }

    fn context_slot(&mut self, name: &str) -> usize {
        if let Some(&index) = self.context_index.get(name) {
            return index;
        }
        let index = self.contexts.len();
        self.contexts.push(Context::new(name));
        self.context_index.insert(name.to_string(), index);
        index
    }

    pub fn push(&mut self, extracted: ExtractedMessage) {
        let ExtractedMessage {
            context,
            source,
            comment,
            numerus,
            locations,
        } = extracted;
        let locations = normalize_locations(locations);
        let key = (context, source, comment);

        match self.slots.get(&key) {
            Some(Slot::Live { context, message }) => {
                let target = &mut self.contexts[*context].messages[*message];
                let warning = MergeConflictWarning {
                    context: key.0.clone(),
                    source: key.1.clone(),
                    comment: key.2.clone(),
                    locations: locations.clone(),
                };
                tracing::warn!("{warning}");
                for location in locations {
                    if !target.locations.contains(&location) {
                        target.locations.push(location);
                    }
                }
                self.report.conflicts.push(warning);
            },
            Some(Slot::Pending(index)) => {
                let index = *index;
                let message = self.pending[index].take().map(|(_, message)| message);
                let message = match message {
                    Some(old) => {
                        self.report.matched += 1;
                        self.update(old, numerus, locations)
                    },
                    None => self.create(&key, numerus, locations),
                };
                self.place(key, message);
            },
            None => {
                let message = self.create(&key, numerus, locations);
                self.place(key, message);
            },
        }
    }

    fn create(&mut self, key: &Key, numerus: bool, locations: Vec<Location>) -> Message {
        self.report.added += 1;
        let mut message = Message::new(key.1.clone());
        message.comment = key.2.clone();
        message.locations = locations;
        if numerus {
            message.translation = Translation::empty_plural(self.plural_forms);
        }
        message
    }

    fn update(&mut self, mut message: Message, numerus: bool, locations: Vec<Location>) -> Message {
        if !message.status.is_live() {
            message.status = Status::Unfinished;
            self.report.revived += 1;
        }
        if message.is_numerus() != numerus {
            message.translation = match std::mem::take(&mut message.translation).reshape(numerus) {
                Translation::Plural(mut forms) => {
                    if forms.len() < self.plural_forms {
                        forms.resize(self.plural_forms, String::new());
                    }
                    Translation::Plural(forms)
                },
                single => single,
            };
            if message.status == Status::Finished {
                message.status = Status::Unfinished;
            }
        }
        message.locations = locations;
        message
    }

    fn place(&mut self, key: Key, message: Message) {
        let context = self.context_slot(&key.0);
        let messages = &mut self.contexts[context].messages;
        messages.push(message);
        let slot = Slot::Live {
            context,
            message: messages.len() - 1,
        };
        self.slots.insert(key, slot);
    }

    pub fn finish(mut self) -> MergeOutcome {
        for (context_name, mut message) in std::mem::take(&mut self.pending).into_iter().flatten() {
            if self.options.no_obsolete {
                self.report.removed += 1;
                continue;
            }
            if message.status.is_live() {
                message.status = Status::Obsolete;
                self.report.obsoleted += 1;
            }
            let context = self.context_slot(&context_name);
            self.contexts[context].messages.push(message);
        }

        let mut catalog = Catalog::new(self.language);
        catalog.version = self.version;
        catalog.source_language = self.source_language;
        catalog.dependencies = self.dependencies;
        for context in self.contexts {
            if !context.messages.is_empty() {
                catalog.push_context(context);
            }
        }

        tracing::debug!(
            added = self.report.added,
            matched = self.report.matched,
            revived = self.report.revived,
            obsoleted = self.report.obsoleted,
            removed = self.report.removed,
            conflicts = self.report.conflicts.len(),
            "merge finished"
        );
        MergeOutcome {
            catalog,
            report: self.report,
        }
    }
}

/// Merges `new` into `old`; see the module docs.
pub fn merge(
    old: Catalog,
    new: impl IntoIterator<Item = ExtractedMessage>,
    options: &MergeOptions,
) -> MergeOutcome {
    let mut merger = Merger::new(old, *options);
    for extracted in new {
        merger.push(extracted);
    }
    merger.finish()
}

fn normalize_locations(locations: Vec<Location>) -> Vec<Location> {
    locations
        .into_iter()
        .map(|location| match location {
            Location::File { file, .. } if file.is_empty() => Location::Anonymous,
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(source: &str, text: &str) -> Message {
        let mut message = Message::new(source);
        message.translation = Translation::Single(text.to_string());
        message.status = Status::Finished;
        message
    }

    #[test]
    fn test_numerus_change_reshapes_and_demotes() {
        let mut old = Catalog::new(Some("pl".to_string()));
        old.context_mut_or_insert("A")
            .messages
            .push(finished("%n items", "%n elementów"));

        let outcome = merge(
            old,
            [ExtractedMessage::new("A", "%n items").with_numerus(true)],
            &MergeOptions::default(),
        );
        let message = outcome.catalog.find("A", "%n items", "").unwrap();
        assert_eq!(message.status, Status::Unfinished);
        assert_eq!(
            message.translation,
            Translation::Plural(vec!["%n elementów".to_string(), String::new(), String::new()])
        );
    }

    #[test]
    fn test_new_numerus_message_gets_one_form_per_plural() {
        let outcome = merge(
            Catalog::new(Some("ar".to_string())),
            [ExtractedMessage::new("A", "%n days").with_numerus(true)],
            &MergeOptions::default(),
        );
        let message = outcome.catalog.find("A", "%n days", "").unwrap();
        assert_eq!(message.translation.forms().len(), 6);
        assert!(message.translation.is_empty());
    }

    #[test]
    fn test_no_obsolete_drops_unmatched() {
        let mut old = Catalog::new(None);
        old.context_mut_or_insert("A").messages.push(finished("Gone", "Weg"));
        old.context_mut_or_insert("B").messages.push(finished("Kept", "Da"));

        let outcome = merge(
            old,
            [ExtractedMessage::new("B", "Kept")],
            &MergeOptions { no_obsolete: true },
        );
        assert!(outcome.catalog.context("A").is_none());
        assert_eq!(outcome.report.removed, 1);
        assert_eq!(outcome.catalog.message_count(), 1);
    }

    #[test]
    fn test_old_duplicates_are_retained() {
        let mut old = Catalog::new(None);
        let context = old.context_mut_or_insert("A");
        context.messages.push(finished("Save", "Sichern"));
        context.messages.push(finished("Save", "Speichern"));

        let outcome = merge(old, [ExtractedMessage::new("A", "Save")], &MergeOptions::default());
        let messages = &outcome.catalog.context("A").unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].status, Status::Finished);
        assert_eq!(messages[0].translation, Translation::Single("Sichern".to_string()));
        assert_eq!(messages[1].status, Status::Obsolete);
    }

    #[test]
    fn test_empty_file_location_becomes_anonymous() {
        let outcome = merge(
            Catalog::new(None),
            [ExtractedMessage::new("A", "x").with_locations(vec![Location::file_only("")])],
            &MergeOptions::default(),
        );
        let message = outcome.catalog.find("A", "x", "").unwrap();
        assert_eq!(message.locations, vec![Location::Anonymous]);
    }

    #[test]
    fn test_extracted_message_from_json() {
        let extracted: Vec<ExtractedMessage> = serde_json::from_str(
            r#"[
                {"context": "Main", "source": "Quit", "locations": [{"file": "main.cpp", "line": 7}]},
                {"context": "Main", "source": "%n files", "comment": "status", "numerus": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            extracted[0],
            ExtractedMessage::new("Main", "Quit")
                .with_locations(vec![Location::file_line("main.cpp", 7)])
        );
        assert!(extracted[1].numerus);
        assert_eq!(extracted[1].comment, "status");
    }
}

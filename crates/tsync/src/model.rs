//! In-memory catalog model.
//!
//! A [`Catalog`] owns its [`Context`]s, which own their [`Message`]s. Context
//! names are unique and kept in insertion order; message order inside a
//! context is preserved so that writing a catalog back produces a stable diff.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The schema version written by [`crate::ts::serialize`].
pub const DEFAULT_VERSION: &str = "2.1";

/// Separates length variants inside one translation text, longest first.
pub const LENGTH_VARIANT_SEPARATOR: char = '\u{9c}';

/// Lifecycle state of a message.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// Translated and reviewed.
    Finished,
    /// Missing a translation, or in need of review.
    #[default]
    Unfinished,
    /// No longer present in the sources; kept for reuse.
    Obsolete,
    /// No longer present in the sources after having been finished.
    Vanished,
}

impl Status {
    /// Whether the message still exists in the sources.
    pub fn is_live(self) -> bool {
        matches!(self, Status::Finished | Status::Unfinished)
    }

    /// The value of the `type` attribute of `<translation>`, if any.
    pub fn type_attribute(self) -> Option<&'static str> {
        match self {
            Status::Finished => None,
            Status::Unfinished => Some("unfinished"),
            Status::Obsolete => Some("obsolete"),
            Status::Vanished => Some("vanished"),
        }
    }
}

/// Translated text of a message.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Translation {
    /// A plain message.
    Single(String),
    /// A numerus message: one entry per plural form.
    Plural(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Translation::Single(String::new())
    }
}

impl Translation {
    /// An untranslated numerus value with `forms` empty forms.
    pub fn empty_plural(forms: usize) -> Self {
        Translation::Plural(vec![String::new(); forms])
    }

    /// True when no form carries any text.
    pub fn is_empty(&self) -> bool {
        match self {
            Translation::Single(text) => text.is_empty(),
            Translation::Plural(forms) => forms.iter().all(String::is_empty),
        }
    }

    /// The individual forms; a single translation is one form.
    pub fn forms(&self) -> &[String] {
        match self {
            Translation::Single(text) => std::slice::from_ref(text),
            Translation::Plural(forms) => forms,
        }
    }

    /// Converts into the shape requested by `numerus`.
    ///
    /// A single text becomes the first plural form; plural forms collapse to
    /// their first form.
    pub fn reshape(self, numerus: bool) -> Self {
        match (self, numerus) {
            (Translation::Single(text), true) => Translation::Plural(vec![text]),
            (Translation::Plural(forms), false) => {
                Translation::Single(forms.into_iter().next().unwrap_or_default())
            },
            (same, _) => same,
        }
    }
}

/// A source position of a message.
///
/// Locations held by the model are always resolved: the relative encoding used
/// on disk only exists inside [`crate::location`].
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum Location {
    /// A message with no position at all.
    Anonymous,
    /// A file, with a line unless the file has no line concept (e.g. a form).
    File {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
}

impl Location {
    pub fn file_line(file: impl Into<String>, line: u32) -> Self {
        Location::File {
            file: file.into(),
            line: Some(line),
        }
    }

    pub fn file_only(file: impl Into<String>) -> Self {
        Location::File {
            file: file.into(),
            line: None,
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Location::Anonymous => None,
            Location::File { file, .. } => Some(file),
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Location::Anonymous => None,
            Location::File { line, .. } => *line,
        }
    }
}

/// An `extra-*` element carried through unchanged.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Extra {
    /// Element name, including the `extra-` prefix.
    pub name: String,
    pub value: String,
}

/// Borrowed identity of a message.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MessageKey<'a> {
    pub context: &'a str,
    pub source: &'a str,
    pub comment: &'a str,
}

impl std::fmt::Display for MessageKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.comment.is_empty() {
            write!(f, "{}/{:?}", self.context, self.source)
        } else {
            write!(f, "{}/{:?} ({})", self.context, self.source, self.comment)
        }
    }
}

/// One translatable string with its metadata.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Message {
    pub source: String,
    /// Disambiguation comment; empty when absent. Part of the message key.
    pub comment: String,
    /// Note for translators from the developer.
    pub extra_comment: Option<String>,
    /// Note written by the translator.
    pub translator_comment: Option<String>,
    /// Source text of a previous revision, kept as a hint for translators.
    pub old_source: Option<String>,
    pub old_comment: Option<String>,
    /// Opaque `<userdata>` payload.
    pub user_data: Option<String>,
    pub translation: Translation,
    pub status: Status,
    pub locations: Vec<Location>,
    pub extras: Vec<Extra>,
}

impl Message {
    /// A new, untranslated message.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn is_numerus(&self) -> bool {
        matches!(self.translation, Translation::Plural(_))
    }

    /// The `(source, comment)` part of the key.
    pub fn id(&self) -> (&str, &str) {
        (&self.source, &self.comment)
    }
}

/// A named group of messages, usually one UI class.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Context {
    pub name: String,
    /// Context-level `<comment>`.
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            messages: Vec::new(),
        }
    }

    pub fn find(&self, source: &str, comment: &str) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.source == source && m.comment == comment)
    }
}

/// All contexts and messages for one target locale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Catalog {
    /// Value of the `version` attribute of the root element.
    pub version: String,
    /// Target locale, e.g. `fr_FR`.
    pub language: Option<String>,
    pub source_language: Option<String>,
    /// Catalogs this one depends on, from `<dependencies>`.
    pub dependencies: Vec<String>,
    contexts: Vec<Context>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Catalog {
    pub fn new(language: Option<String>) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            language,
            source_language: None,
            dependencies: Vec::new(),
            contexts: Vec::new(),
        }
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn contexts_mut(&mut self) -> impl Iterator<Item = &mut Context> {
        self.contexts.iter_mut()
    }

    pub fn into_contexts(self) -> Vec<Context> {
        self.contexts
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Returns the context called `name`, appending an empty one if needed.
    pub fn context_mut_or_insert(&mut self, name: &str) -> &mut Context {
        let index = match self.contexts.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            },
        };
        &mut self.contexts[index]
    }

    /// Appends a context, folding its messages into an existing context of
    /// the same name.
    pub fn push_context(&mut self, context: Context) {
        match self.contexts.iter_mut().find(|c| c.name == context.name) {
            Some(existing) => {
                if existing.comment.is_none() {
                    existing.comment = context.comment;
                }
                existing.messages.extend(context.messages);
            },
            None => self.contexts.push(context),
        }
    }

    pub fn find(&self, context: &str, source: &str, comment: &str) -> Option<&Message> {
        self.context(context)?.find(source, comment)
    }

    /// Iterates over every message together with its context name.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Number of messages per status, in `Finished, Unfinished, Obsolete,
    /// Vanished` order.
    pub fn status_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for (_, message) in self.messages() {
            let slot = match message.status {
                Status::Finished => 0,
                Status::Unfinished => 1,
                Status::Obsolete => 2,
                Status::Vanished => 3,
            };
            counts[slot] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_attribute_roundtrip() {
        for status in [
            Status::Finished,
            Status::Unfinished,
            Status::Obsolete,
            Status::Vanished,
        ] {
            match status.type_attribute() {
                Some(attr) => assert_eq!(attr.parse::<Status>().unwrap(), status),
                None => assert_eq!(status, Status::Finished),
            }
        }
        assert!("finished-ish".parse::<Status>().is_err());
    }

    #[test]
    fn test_reshape_translation() {
        let single = Translation::Single("Fichier".to_string());
        assert_eq!(
            single.clone().reshape(true),
            Translation::Plural(vec!["Fichier".to_string()])
        );
        assert_eq!(single.clone().reshape(false), single);
        assert_eq!(
            Translation::Plural(Vec::new()).reshape(false),
            Translation::Single(String::new())
        );
    }

    #[test]
    fn test_push_context_folds_duplicates() {
        let mut catalog = Catalog::new(Some("de".to_string()));
        let mut first = Context::new("A");
        first.messages.push(Message::new("one"));
        let mut second = Context::new("A");
        second.messages.push(Message::new("two"));

        catalog.push_context(first);
        catalog.push_context(Context::new("B"));
        catalog.push_context(second);

        assert_eq!(catalog.contexts().len(), 2);
        assert_eq!(catalog.contexts()[0].messages.len(), 2);
        assert!(catalog.find("A", "two", "").is_some());
    }

    #[test]
    fn test_extraction_location_json() {
        let locations: Vec<Location> =
            serde_json::from_str(r#"[{"file": "a.cpp", "line": 3}, {"file": "form.ui"}, null]"#)
                .unwrap();
        assert_eq!(
            locations,
            vec![
                Location::file_line("a.cpp", 3),
                Location::file_only("form.ui"),
                Location::Anonymous,
            ]
        );
    }
}

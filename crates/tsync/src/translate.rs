//! Runtime lookup over a loaded catalog.

use crate::model::{Catalog, Translation};
use crate::plural::{self, PluralRule};
use std::collections::HashMap;

/// Read-only lookup table built from a catalog.
///
/// Only live messages with a non-empty translation are indexed; everything
/// else falls back to the source text.
#[derive(Clone, Debug)]
pub struct Translator<'a> {
    rule: PluralRule,
    entries: HashMap<(&'a str, &'a str, &'a str), &'a Translation>,
}

impl<'a> Translator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        let entries = catalog
            .messages()
            .filter(|(_, message)| message.status.is_live() && !message.translation.is_empty())
            .map(|(context, message)| {
                (
                    (context, message.source.as_str(), message.comment.as_str()),
                    &message.translation,
                )
            })
            .collect();
        Self {
            rule: plural::rule_for(catalog.language.as_deref()),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translates `source`, choosing a plural form when `n` is given.
    ///
    /// Lookup tries `(context, source, comment)` and then
    /// `(context, source, "")`. `%n` is replaced by `n` in the result.
    pub fn translate(&self, context: &str, source: &str, comment: &str, n: Option<u64>) -> String {
        let found = self
            .entries
            .get(&(context, source, comment))
            .or_else(|| self.entries.get(&(context, source, "")));

        let text = match (found, n) {
            (Some(Translation::Single(text)), _) => text.as_str(),
            (Some(Translation::Plural(forms)), n) => {
                let index = n.map_or(0, |n| self.rule.select(n));
                let form = forms
                    .get(index)
                    .or_else(|| forms.last())
                    .map(String::as_str)
                    .unwrap_or_default();
                if form.is_empty() { source } else { form }
            },
            (None, _) => source,
        };

        match n {
            Some(n) => text.replace("%n", &n.to_string()),
            None => text.to_string(),
        }
    }
}

use crate::location::{EncodedLocation, LocationCursor, LocationMode, encode_absolute, encode_with};
use crate::model::{Catalog, Context, LENGTH_VARIANT_SEPARATOR, Message, Translation};
use std::fmt::Write as _;
use std::io;

const MESSAGE_INDENT: &str = "    ";
const CHILD_INDENT: &str = "        ";
const FORM_INDENT: &str = "            ";

/// Output options for [`serialize_with`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SerializeOptions {
    pub locations: LocationMode,
}

/// Writes `catalog` in the canonical layout with relative locations.
pub fn serialize(catalog: &Catalog) -> String {
    serialize_with(catalog, &SerializeOptions::default())
}

pub fn serialize_with(catalog: &Catalog, options: &SerializeOptions) -> String {
    let mut out = String::new();
    write_header(&mut out, catalog);
    let mut cursor = LocationCursor::new();
    for context in catalog.contexts() {
        cursor = write_context(&mut out, context, cursor, options.locations);
    }
    out.push_str("</TS>\n");
    out
}

/// Streams `catalog` to `writer` one context at a time.
pub fn write_to<W: io::Write>(
    writer: &mut W,
    catalog: &Catalog,
    options: &SerializeOptions,
) -> io::Result<()> {
    let mut chunk = String::new();
    write_header(&mut chunk, catalog);
    writer.write_all(chunk.as_bytes())?;

    let mut cursor = LocationCursor::new();
    for context in catalog.contexts() {
        chunk.clear();
        cursor = write_context(&mut chunk, context, cursor, options.locations);
        writer.write_all(chunk.as_bytes())?;
    }
    writer.write_all(b"</TS>\n")
}

fn write_header(out: &mut String, catalog: &Catalog) {
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"");
    push_attribute(out, &catalog.version);
    out.push('"');
    if let Some(language) = &catalog.language {
        out.push_str(" language=\"");
        push_attribute(out, language);
        out.push('"');
    }
    if let Some(source_language) = &catalog.source_language {
        out.push_str(" sourcelanguage=\"");
        push_attribute(out, source_language);
        out.push('"');
    }
    out.push_str(">\n");
    if !catalog.dependencies.is_empty() {
        out.push_str("<dependencies>\n");
        for dependency in &catalog.dependencies {
            out.push_str(MESSAGE_INDENT);
            out.push_str("<dependency catalog=\"");
            push_attribute(out, dependency);
            out.push_str("\"/>\n");
        }
        out.push_str("</dependencies>\n");
    }
}

fn write_context(
    out: &mut String,
    context: &Context,
    mut cursor: LocationCursor,
    mode: LocationMode,
) -> LocationCursor {
    out.push_str("<context>\n");
    out.push_str(MESSAGE_INDENT);
    push_element(out, "name", &context.name);
    if let Some(comment) = &context.comment {
        out.push_str(MESSAGE_INDENT);
        push_element(out, "comment", comment);
    }
    for message in &context.messages {
        let encoded = match mode {
            LocationMode::Relative => {
                let (encoded, next) = encode_with(cursor, &message.locations);
                cursor = next;
                encoded
            },
            LocationMode::Absolute => encode_absolute(&message.locations),
            LocationMode::None => Vec::new(),
        };
        write_message(out, message, &encoded);
    }
    out.push_str("</context>\n");
    cursor
}

fn write_message(out: &mut String, message: &Message, locations: &[EncodedLocation]) {
    out.push_str(MESSAGE_INDENT);
    if message.is_numerus() {
        out.push_str("<message numerus=\"yes\">\n");
    } else {
        out.push_str("<message>\n");
    }

    for location in locations {
        out.push_str(CHILD_INDENT);
        match location {
            EncodedLocation::Anonymous => out.push_str("<location filename=\"\"/>\n"),
            EncodedLocation::Entry { file, line } => {
                out.push_str("<location");
                if let Some(file) = file {
                    out.push_str(" filename=\"");
                    push_attribute(out, file);
                    out.push('"');
                }
                if let Some(line) = line {
                    let _ = write!(out, " line=\"{line}\"");
                }
                out.push_str("/>\n");
            },
        }
    }

    out.push_str(CHILD_INDENT);
    push_element(out, "source", &message.source);
    if let Some(old_source) = &message.old_source {
        out.push_str(CHILD_INDENT);
        push_element(out, "oldsource", old_source);
    }
    if !message.comment.is_empty() {
        out.push_str(CHILD_INDENT);
        push_element(out, "comment", &message.comment);
    }
    if let Some(old_comment) = &message.old_comment {
        out.push_str(CHILD_INDENT);
        push_element(out, "oldcomment", old_comment);
    }
    if let Some(extra_comment) = &message.extra_comment {
        out.push_str(CHILD_INDENT);
        push_element(out, "extracomment", extra_comment);
    }
    if let Some(translator_comment) = &message.translator_comment {
        out.push_str(CHILD_INDENT);
        push_element(out, "translatorcomment", translator_comment);
    }

    out.push_str(CHILD_INDENT);
    out.push_str("<translation");
    if let Some(kind) = message.status.type_attribute() {
        let _ = write!(out, " type=\"{kind}\"");
    }
    match &message.translation {
        Translation::Single(text) if text.contains(LENGTH_VARIANT_SEPARATOR) => {
            out.push_str(" variants=\"yes\">\n");
            for variant in text.split(LENGTH_VARIANT_SEPARATOR) {
                out.push_str(FORM_INDENT);
                push_element(out, "lengthvariant", variant);
            }
            out.push_str(CHILD_INDENT);
        },
        Translation::Single(text) => {
            out.push('>');
            push_text(out, text);
        },
        Translation::Plural(forms) if forms.is_empty() => out.push('>'),
        Translation::Plural(forms) => {
            out.push_str(">\n");
            for form in forms {
                out.push_str(FORM_INDENT);
                if form.contains(LENGTH_VARIANT_SEPARATOR) {
                    out.push_str("<numerusform variants=\"yes\">");
                    for variant in form.split(LENGTH_VARIANT_SEPARATOR) {
                        out.push_str("<lengthvariant>");
                        push_text(out, variant);
                        out.push_str("</lengthvariant>");
                    }
                    out.push_str("</numerusform>\n");
                } else {
                    push_element(out, "numerusform", form);
                }
            }
            out.push_str(CHILD_INDENT);
        },
    }
    out.push_str("</translation>\n");
    if let Some(user_data) = &message.user_data {
        out.push_str(CHILD_INDENT);
        push_element(out, "userdata", user_data);
    }

    for extra in &message.extras {
        out.push_str(CHILD_INDENT);
        push_element(out, &extra.name, &extra.value);
    }

    out.push_str(MESSAGE_INDENT);
    out.push_str("</message>\n");
}

/// `<name>text</name>` followed by a newline.
fn push_element(out: &mut String, name: &str, text: &str) {
    let _ = write!(out, "<{name}>");
    push_text(out, text);
    let _ = writeln!(out, "</{name}>");
}

/// Escapes `text` the way it appears inside a catalog element.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_text(&mut out, text);
    out
}

/// Escapes character data. Control characters that XML 1.0 cannot carry are
/// written as `<byte>` elements.
fn push_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\r' => out.push_str("&#xd;"),
            '\n' | '\t' => out.push(ch),
            c if c < ' ' => {
                let _ = write!(out, "<byte value=\"x{:x}\"/>", u32::from(c));
            },
            c => out.push(c),
        }
    }
}

fn push_attribute(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("&#xa;"),
            '\t' => out.push_str("&#x9;"),
            '\r' => out.push_str("&#xd;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, Status};

    #[test]
    fn test_escapes_text_and_control_characters() {
        let mut out = String::new();
        push_text(&mut out, "a<b & \"c\"\r\n\u{1b}");
        assert_eq!(
            out,
            "a&lt;b &amp; &quot;c&quot;&#xd;\n<byte value=\"x1b\"/>"
        );
    }

    #[test]
    fn test_escapes_attribute_values() {
        let mut out = String::new();
        push_attribute(&mut out, "a\"b&c<'d'>\n\t");
        assert_eq!(out, "a&quot;b&amp;c&lt;&apos;d&apos;&gt;&#xa;&#x9;");

        let catalog = Catalog::new(Some("x\"y".to_string()));
        assert!(serialize(&catalog).contains("language=\"x&quot;y\""));
    }

    #[test]
    fn test_escape_text_matches_element_content() {
        assert_eq!(escape_text("a & b\r\n"), "a &amp; b&#xd;\n");
        assert_eq!(escape_text("\u{7}"), "<byte value=\"x7\"/>");
    }

    #[test]
    fn test_length_variants_layout() {
        let mut message = Message::new("Open");
        message.status = Status::Finished;
        message.translation = Translation::Single("Öffnen\u{9c}Öff.".to_string());
        let mut out = String::new();
        write_message(&mut out, &message, &[]);
        assert!(out.contains(
            "<translation variants=\"yes\">\n            \
             <lengthvariant>Öffnen</lengthvariant>\n            \
             <lengthvariant>Öff.</lengthvariant>\n        </translation>\n"
        ));

        let mut plural = Message::new("%n files");
        plural.status = Status::Finished;
        plural.translation = Translation::Plural(vec![
            "%n Datei\u{9c}%n D.".to_string(),
            "%n Dateien".to_string(),
        ]);
        let mut out = String::new();
        write_message(&mut out, &plural, &[]);
        assert!(out.contains(
            "<numerusform variants=\"yes\"><lengthvariant>%n Datei</lengthvariant>\
             <lengthvariant>%n D.</lengthvariant></numerusform>\n"
        ));
        assert!(out.contains("<numerusform>%n Dateien</numerusform>\n"));
    }

    #[test]
    fn test_empty_plural_translation_is_one_line() {
        let mut message = Message::new("%n files");
        message.translation = Translation::Plural(Vec::new());
        let mut out = String::new();
        write_message(&mut out, &message, &[]);
        assert!(out.contains("<message numerus=\"yes\">"));
        assert!(out.contains("<translation type=\"unfinished\"></translation>"));
    }

    #[test]
    fn test_location_modes() {
        let mut catalog = Catalog::new(Some("de".to_string()));
        let context = catalog.context_mut_or_insert("Main");
        let mut message = Message::new("Open");
        message.status = Status::Finished;
        message.locations = vec![
            Location::file_line("main.cpp", 10),
            Location::file_line("main.cpp", 14),
        ];
        context.messages.push(message);

        let relative = serialize(&catalog);
        assert!(relative.contains("<location filename=\"main.cpp\" line=\"10\"/>"));
        assert!(relative.contains("<location line=\"+4\"/>"));

        let absolute = serialize_with(&catalog, &SerializeOptions {
            locations: LocationMode::Absolute,
        });
        assert!(absolute.contains("<location filename=\"main.cpp\" line=\"14\"/>"));

        let none = serialize_with(&catalog, &SerializeOptions {
            locations: LocationMode::None,
        });
        assert!(!none.contains("<location"));
    }

    #[test]
    fn test_write_to_matches_serialize() {
        let mut catalog = Catalog::new(None);
        catalog.context_mut_or_insert("A").messages.push(Message::new("x"));
        catalog.context_mut_or_insert("B").messages.push(Message::new("y"));

        let mut bytes = Vec::new();
        write_to(&mut bytes, &catalog, &SerializeOptions::default()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), serialize(&catalog));
    }
}

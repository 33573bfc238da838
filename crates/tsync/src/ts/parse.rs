use crate::error::ParseError;
use crate::location::{EncodedLocation, LineRef, LocationCursor, decode_with};
use crate::model::{
    Catalog, Context, Extra, LENGTH_VARIANT_SEPARATOR, Message, Status, Translation,
};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

/// Catalog versions this parser understands.
pub const SUPPORTED_VERSIONS: &[&str] = &["2.0", "2.1"];

/// Parses a TS document.
pub fn parse(bytes: &[u8]) -> Result<Catalog, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut events = Events::new(text);

    loop {
        match events.next()? {
            Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {},
            Event::Text(text) if is_blank(&text) => {},
            Event::Start(start) if start.name().as_ref() == b"TS" => {
                let catalog = parse_ts(&mut events, &start, false)?;
                events.expect_end_of_document()?;
                return Ok(catalog);
            },
            Event::Empty(start) if start.name().as_ref() == b"TS" => {
                let catalog = parse_ts(&mut events, &start, true)?;
                events.expect_end_of_document()?;
                return Ok(catalog);
            },
            Event::Start(start) | Event::Empty(start) => {
                return Err(events.unexpected_element(&start, "document"));
            },
            Event::Eof => return Err(ParseError::MissingRoot),
            _ => return Err(events.unexpected_text("document")),
        }
    }
}

struct Events<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Events<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            reader: Reader::from_str(text),
        }
    }

    fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn next(&mut self) -> Result<Event<'a>, ParseError> {
        self.reader.read_event().map_err(|err| ParseError::Xml {
            position: self.position(),
            message: err.to_string(),
        })
    }

    fn xml_error(&self, err: impl std::fmt::Display) -> ParseError {
        ParseError::Xml {
            position: self.position(),
            message: err.to_string(),
        }
    }

    fn unexpected_element(&self, start: &BytesStart<'_>, parent: &'static str) -> ParseError {
        ParseError::UnexpectedElement {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            parent,
            position: self.position(),
        }
    }

    fn unexpected_text(&self, parent: &'static str) -> ParseError {
        ParseError::UnexpectedText {
            parent,
            position: self.position(),
        }
    }

    fn missing(&self, name: &'static str, parent: &'static str) -> ParseError {
        ParseError::MissingElement {
            name,
            parent,
            position: self.position(),
        }
    }

    fn attributes(&self, start: &BytesStart<'_>) -> Result<Attributes, ParseError> {
        let mut pairs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.xml_error(err))?;
            let value = attr.unescape_value().map_err(|err| self.xml_error(err))?;
            pairs.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(Attributes(pairs))
    }

    fn expect_end_of_document(&mut self) -> Result<(), ParseError> {
        loop {
            match self.next()? {
                Event::Eof => return Ok(()),
                Event::Comment(_) | Event::PI(_) => {},
                Event::Text(text) if is_blank(&text) => {},
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, "document"));
                },
                _ => return Err(self.unexpected_text("document")),
            }
        }
    }

    /// Reads character data up to the end tag of the current element.
    ///
    /// `<byte value="…"/>` escapes are decoded in place.
    fn read_text(&mut self, parent: &'static str) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.next()? {
                Event::Text(text) => {
                    let text = text.unescape().map_err(|err| self.xml_error(err))?;
                    out.push_str(&text);
                },
                Event::CData(data) => {
                    out.push_str(&String::from_utf8_lossy(&data.into_inner()));
                },
                Event::Empty(start) if start.name().as_ref() == b"byte" => {
                    out.push(self.byte_value(&start)?);
                },
                Event::Start(start) if start.name().as_ref() == b"byte" => {
                    out.push(self.byte_value(&start)?);
                    self.skip_to_end("byte")?;
                },
                Event::Comment(_) => {},
                Event::End(_) => return Ok(out),
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, parent));
                },
                Event::Eof => return Err(ParseError::UnexpectedEof),
                _ => return Err(self.unexpected_text(parent)),
            }
        }
    }

    /// Reads `<lengthvariant>` children, joined with
    /// [`LENGTH_VARIANT_SEPARATOR`].
    fn read_variants(&mut self, parent: &'static str) -> Result<String, ParseError> {
        let mut variants = Vec::new();
        loop {
            match self.next()? {
                Event::Start(start) if start.name().as_ref() == b"lengthvariant" => {
                    variants.push(self.read_text("lengthvariant")?);
                },
                Event::Empty(start) if start.name().as_ref() == b"lengthvariant" => {
                    variants.push(String::new());
                },
                Event::End(_) => break,
                Event::Comment(_) => {},
                Event::Text(text) if is_blank(&text) => {},
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, parent));
                },
                Event::Eof => return Err(ParseError::UnexpectedEof),
                _ => return Err(self.unexpected_text(parent)),
            }
        }
        let separator = LENGTH_VARIANT_SEPARATOR.to_string();
        Ok(variants.join(separator.as_str()))
    }

    /// Reads the text of `start`, which may hold length variants.
    fn read_translated_text(
        &mut self,
        start: &BytesStart<'_>,
        parent: &'static str,
    ) -> Result<String, ParseError> {
        if self.attributes(start)?.get("variants") == Some("yes") {
            self.read_variants(parent)
        } else {
            self.read_text(parent)
        }
    }

    fn byte_value(&self, start: &BytesStart<'_>) -> Result<char, ParseError> {
        let attrs = self.attributes(start)?;
        let raw = attrs.get("value").unwrap_or_default();
        let (digits, radix) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix('x')) {
            Some(hex) => (hex, 16),
            None => (raw, 10),
        };
        u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| ParseError::InvalidAttribute {
                name: "value",
                value: raw.to_string(),
                position: self.position(),
            })
    }

    /// Consumes events up to the end tag of an element that must stay empty.
    fn skip_to_end(&mut self, parent: &'static str) -> Result<(), ParseError> {
        loop {
            match self.next()? {
                Event::End(_) => return Ok(()),
                Event::Comment(_) => {},
                Event::Text(text) if is_blank(&text) => {},
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, parent));
                },
                Event::Eof => return Err(ParseError::UnexpectedEof),
                _ => return Err(self.unexpected_text(parent)),
            }
        }
    }
}

struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn parse_ts(
    events: &mut Events<'_>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<Catalog, ParseError> {
    let attrs = events.attributes(start)?;
    let version = attrs.get("version").ok_or(ParseError::MissingVersion {
        position: events.position(),
    })?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ParseError::UnsupportedVersion {
            found: version.to_string(),
            position: events.position(),
        });
    }

    let mut catalog = Catalog::new(attrs.get("language").map(str::to_string));
    catalog.version = version.to_string();
    catalog.source_language = attrs.get("sourcelanguage").map(str::to_string);

    if empty {
        return Ok(catalog);
    }

    let mut cursor = LocationCursor::new();
    loop {
        match events.next()? {
            Event::Start(start) if start.name().as_ref() == b"context" => {
                let context = parse_context(events, &mut cursor)?;
                catalog.push_context(context);
            },
            Event::Empty(start) if start.name().as_ref() == b"context" => {
                return Err(events.missing("name", "context"));
            },
            Event::Start(start) if start.name().as_ref() == b"dependencies" => {
                catalog.dependencies.extend(parse_dependencies(events)?);
            },
            Event::Empty(start) if start.name().as_ref() == b"dependencies" => {},
            Event::End(_) => return Ok(catalog),
            Event::Comment(_) => {},
            Event::Text(text) if is_blank(&text) => {},
            Event::Start(start) | Event::Empty(start) => {
                return Err(events.unexpected_element(&start, "TS"));
            },
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => return Err(events.unexpected_text("TS")),
        }
    }
}

fn parse_dependencies(events: &mut Events<'_>) -> Result<Vec<String>, ParseError> {
    let mut catalogs = Vec::new();
    loop {
        match events.next()? {
            Event::Start(start) if start.name().as_ref() == b"dependency" => {
                catalogs.extend(dependency_catalog(events, &start)?);
                events.skip_to_end("dependency")?;
            },
            Event::Empty(start) if start.name().as_ref() == b"dependency" => {
                catalogs.extend(dependency_catalog(events, &start)?);
            },
            Event::End(_) => return Ok(catalogs),
            Event::Comment(_) => {},
            Event::Text(text) if is_blank(&text) => {},
            Event::Start(start) | Event::Empty(start) => {
                return Err(events.unexpected_element(&start, "dependencies"));
            },
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => return Err(events.unexpected_text("dependencies")),
        }
    }
}

fn dependency_catalog(
    events: &Events<'_>,
    start: &BytesStart<'_>,
) -> Result<Option<String>, ParseError> {
    Ok(events.attributes(start)?.get("catalog").map(str::to_string))
}

fn parse_context(
    events: &mut Events<'_>,
    cursor: &mut LocationCursor,
) -> Result<Context, ParseError> {
    let mut name: Option<String> = None;
    let mut comment = None;
    let mut messages = Vec::new();

    loop {
        match events.next()? {
            Event::Start(start) => match start.name().as_ref() {
                b"name" => name = Some(events.read_text("name")?),
                b"comment" => comment = Some(events.read_text("comment")?),
                b"message" => messages.push(parse_message(events, &start, cursor)?),
                _ => return Err(events.unexpected_element(&start, "context")),
            },
            Event::Empty(start) => match start.name().as_ref() {
                b"name" => name = Some(String::new()),
                b"comment" => comment = Some(String::new()),
                b"message" => return Err(events.missing("source", "message")),
                _ => return Err(events.unexpected_element(&start, "context")),
            },
            Event::End(_) => break,
            Event::Comment(_) => {},
            Event::Text(text) if is_blank(&text) => {},
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => return Err(events.unexpected_text("context")),
        }
    }

    let name = name.ok_or_else(|| events.missing("name", "context"))?;
    Ok(Context {
        name,
        comment,
        messages,
    })
}

fn parse_numerus(events: &Events<'_>, attrs: &Attributes) -> Result<bool, ParseError> {
    match attrs.get("numerus") {
        None | Some("no" | "false") => Ok(false),
        Some("yes" | "true") => Ok(true),
        Some(other) => Err(ParseError::InvalidAttribute {
            name: "numerus",
            value: other.to_string(),
            position: events.position(),
        }),
    }
}

fn parse_location(events: &Events<'_>, start: &BytesStart<'_>) -> Result<EncodedLocation, ParseError> {
    let attrs = events.attributes(start)?;
    let file = attrs.get("filename");
    if file == Some("") {
        return Ok(EncodedLocation::Anonymous);
    }
    let line = match attrs.get("line") {
        None => None,
        Some(raw) => Some(raw.parse::<LineRef>().map_err(|_| ParseError::InvalidAttribute {
            name: "line",
            value: raw.to_string(),
            position: events.position(),
        })?),
    };
    Ok(EncodedLocation::Entry {
        file: file.map(str::to_string),
        line,
    })
}

fn parse_message(
    events: &mut Events<'_>,
    start: &BytesStart<'_>,
    cursor: &mut LocationCursor,
) -> Result<Message, ParseError> {
    let attrs = events.attributes(start)?;
    let numerus = parse_numerus(events, &attrs)?;

    let mut encoded = Vec::new();
    let mut locations_position = None;
    let mut source: Option<String> = None;
    let mut message = Message::default();
    let mut translation: Option<(Translation, Status)> = None;

    loop {
        match events.next()? {
            Event::Start(start) => match start.name().as_ref() {
                b"location" => {
                    locations_position.get_or_insert(events.position());
                    encoded.push(parse_location(events, &start)?);
                    events.skip_to_end("location")?;
                },
                b"source" => source = Some(events.read_text("source")?),
                b"comment" => message.comment = events.read_text("comment")?,
                b"oldsource" => message.old_source = Some(events.read_text("oldsource")?),
                b"oldcomment" => message.old_comment = Some(events.read_text("oldcomment")?),
                b"userdata" => message.user_data = Some(events.read_text("userdata")?),
                b"extracomment" => message.extra_comment = Some(events.read_text("extracomment")?),
                b"translatorcomment" => {
                    message.translator_comment = Some(events.read_text("translatorcomment")?);
                },
                b"translation" => {
                    translation = Some(parse_translation(events, &start, numerus, false)?);
                },
                name if name.starts_with(b"extra-") => {
                    let name = String::from_utf8_lossy(name).into_owned();
                    let value = events.read_text("extra")?;
                    message.extras.push(Extra { name, value });
                },
                _ => return Err(events.unexpected_element(&start, "message")),
            },
            Event::Empty(start) => match start.name().as_ref() {
                b"location" => {
                    locations_position.get_or_insert(events.position());
                    encoded.push(parse_location(events, &start)?);
                },
                b"source" => source = Some(String::new()),
                b"comment" => message.comment = String::new(),
                b"oldsource" => message.old_source = Some(String::new()),
                b"oldcomment" => message.old_comment = Some(String::new()),
                b"userdata" => message.user_data = Some(String::new()),
                b"extracomment" => message.extra_comment = Some(String::new()),
                b"translatorcomment" => message.translator_comment = Some(String::new()),
                b"translation" => {
                    translation = Some(parse_translation(events, &start, numerus, true)?);
                },
                name if name.starts_with(b"extra-") => message.extras.push(Extra {
                    name: String::from_utf8_lossy(name).into_owned(),
                    value: String::new(),
                }),
                _ => return Err(events.unexpected_element(&start, "message")),
            },
            Event::End(_) => break,
            Event::Comment(_) => {},
            Event::Text(text) if is_blank(&text) => {},
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => return Err(events.unexpected_text("message")),
        }
    }

    message.source = source.ok_or_else(|| events.missing("source", "message"))?;

    let (locations, next) =
        decode_with(std::mem::take(cursor), &encoded).map_err(|source| ParseError::Location {
            position: locations_position.unwrap_or_else(|| events.position()),
            source,
        })?;
    *cursor = next;
    message.locations = locations;

    let (translation, status) =
        translation.unwrap_or_else(|| (empty_translation(numerus), Status::Unfinished));
    message.translation = translation;
    message.status = status;
    Ok(message)
}

fn empty_translation(numerus: bool) -> Translation {
    if numerus {
        Translation::Plural(Vec::new())
    } else {
        Translation::default()
    }
}

fn parse_translation(
    events: &mut Events<'_>,
    start: &BytesStart<'_>,
    numerus: bool,
    empty: bool,
) -> Result<(Translation, Status), ParseError> {
    let attrs = events.attributes(start)?;
    let status = match attrs.get("type") {
        None => Status::Finished,
        Some("unfinished") => Status::Unfinished,
        Some("obsolete") => Status::Obsolete,
        Some("vanished") => Status::Vanished,
        Some(other) => {
            return Err(ParseError::InvalidAttribute {
                name: "type",
                value: other.to_string(),
                position: events.position(),
            });
        },
    };

    if empty {
        return Ok((empty_translation(numerus), status));
    }

    if !numerus {
        let text = if attrs.get("variants") == Some("yes") {
            events.read_variants("translation")?
        } else {
            events.read_text("translation")?
        };
        return Ok((Translation::Single(text), status));
    }

    let mut forms = Vec::new();
    loop {
        match events.next()? {
            Event::Start(start) if start.name().as_ref() == b"numerusform" => {
                forms.push(events.read_translated_text(&start, "numerusform")?);
            },
            Event::Empty(start) if start.name().as_ref() == b"numerusform" => {
                forms.push(String::new());
            },
            Event::End(_) => break,
            Event::Comment(_) => {},
            Event::Text(text) if is_blank(&text) => {},
            Event::Start(start) | Event::Empty(start) => {
                return Err(events.unexpected_element(&start, "translation"));
            },
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => return Err(events.unexpected_text("translation")),
        }
    }
    Ok((Translation::Plural(forms), status))
}

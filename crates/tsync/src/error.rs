use crate::location::LocationError;
use thiserror::Error;

/// A catalog could not be read. Parsing stops at the first error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("catalog is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document has no <TS> root element")]
    MissingRoot,

    #[error("<TS> element has no version attribute")]
    MissingVersion { position: u64 },

    #[error("unsupported catalog version '{found}'")]
    UnsupportedVersion { found: String, position: u64 },

    #[error("unexpected <{name}> inside <{parent}>")]
    UnexpectedElement {
        name: String,
        parent: &'static str,
        position: u64,
    },

    #[error("unexpected text inside <{parent}>")]
    UnexpectedText { parent: &'static str, position: u64 },

    #[error("<{parent}> is missing a <{name}> element")]
    MissingElement {
        name: &'static str,
        parent: &'static str,
        position: u64,
    },

    #[error("invalid value '{value}' for attribute '{name}'")]
    InvalidAttribute {
        name: &'static str,
        value: String,
        position: u64,
    },

    #[error("invalid location at byte {position}: {source}")]
    Location {
        position: u64,
        #[source]
        source: LocationError,
    },

    #[error("unexpected end of document")]
    UnexpectedEof,
}

impl ParseError {
    /// Byte offset in the input where the error was detected, if known.
    pub fn position(&self) -> Option<u64> {
        match self {
            ParseError::Xml { position, .. }
            | ParseError::MissingVersion { position }
            | ParseError::UnsupportedVersion { position, .. }
            | ParseError::UnexpectedElement { position, .. }
            | ParseError::UnexpectedText { position, .. }
            | ParseError::MissingElement { position, .. }
            | ParseError::InvalidAttribute { position, .. }
            | ParseError::Location { position, .. } => Some(*position),
            ParseError::Encoding(err) => Some(err.valid_up_to() as u64),
            ParseError::MissingRoot | ParseError::UnexpectedEof => None,
        }
    }
}

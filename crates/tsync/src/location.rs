//! Location codec.
//!
//! On disk, a location may omit its file name (inherit the current file) and
//! may give its line as a signed delta. The cursor that makes this work is an
//! explicit [`LocationCursor`] value threaded through [`encode_with`] and
//! [`decode_with`]; nothing outside this module ever sees a delta.
//!
//! Cursor rules:
//! - every file starts at line 0, and each file remembers the last line
//!   referenced for it;
//! - inside a message the current file is the file of the previous location;
//! - the first location of a message starts from the first file of the
//!   previous message.

use crate::model::Location;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};
use thiserror::Error;

/// How locations are written out.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocationMode {
    /// Omit repeated file names and write line deltas.
    #[default]
    Relative,
    /// Always write the file name and the absolute line.
    Absolute,
    /// Do not write locations at all.
    None,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location inherits a file name but no file is current")]
    NoCurrentFile,
    #[error("line {line} of '{file}' is out of range")]
    LineOutOfRange { file: String, line: i64 },
    #[error("invalid line value '{0}'")]
    InvalidLine(String),
}

/// A line attribute value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LineRef {
    Absolute(u32),
    /// Offset from the last line referenced for the same file.
    Delta(i64),
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRef::Absolute(line) => write!(f, "{line}"),
            LineRef::Delta(delta) => write!(f, "{delta:+}"),
        }
    }
}

impl FromStr for LineRef {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LocationError::InvalidLine(s.to_string());
        if s.starts_with('+') || s.starts_with('-') {
            s.parse::<i64>().map(LineRef::Delta).map_err(|_| invalid())
        } else {
            s.parse::<u32>().map(LineRef::Absolute).map_err(|_| invalid())
        }
    }
}

/// A location as written in a catalog file.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EncodedLocation {
    /// Explicitly no position; written as an empty file name.
    Anonymous,
    /// `file: None` inherits the current file; `line: None` means the file
    /// has no line.
    Entry {
        file: Option<String>,
        line: Option<LineRef>,
    },
}

/// Sequential decoding/encoding state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LocationCursor {
    current_file: Option<String>,
    last_lines: HashMap<String, u32>,
}

impl LocationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    fn last_line(&self, file: &str) -> u32 {
        self.last_lines.get(file).copied().unwrap_or(0)
    }
}

/// Encodes one message's locations relative to `cursor`.
pub fn encode_with(
    mut cursor: LocationCursor,
    locations: &[Location],
) -> (Vec<EncodedLocation>, LocationCursor) {
    let mut local_file = cursor.current_file.clone();
    let mut first_file: Option<String> = None;
    let mut encoded = Vec::with_capacity(locations.len());

    for location in locations {
        let Location::File { file, line } = location else {
            encoded.push(EncodedLocation::Anonymous);
            continue;
        };

        let same_file = local_file.as_deref() == Some(file.as_str());
        let line_ref = line.map(|line| {
            if same_file {
                LineRef::Delta(i64::from(line) - i64::from(cursor.last_line(file)))
            } else {
                LineRef::Absolute(line)
            }
        });
        encoded.push(EncodedLocation::Entry {
            file: (!same_file).then(|| file.clone()),
            line: line_ref,
        });

        if let Some(line) = line {
            cursor.last_lines.insert(file.clone(), *line);
        }
        if first_file.is_none() {
            first_file = Some(file.clone());
        }
        local_file = Some(file.clone());
    }

    if first_file.is_some() {
        cursor.current_file = first_file;
    }
    (encoded, cursor)
}

/// Decodes one message's locations relative to `cursor`.
pub fn decode_with(
    mut cursor: LocationCursor,
    encoded: &[EncodedLocation],
) -> Result<(Vec<Location>, LocationCursor), LocationError> {
    let mut local_file = cursor.current_file.clone();
    let mut first_file: Option<String> = None;
    let mut decoded = Vec::with_capacity(encoded.len());

    for entry in encoded {
        let EncodedLocation::Entry { file, line } = entry else {
            decoded.push(Location::Anonymous);
            continue;
        };

        let file = match file {
            Some(file) => file.clone(),
            None => local_file.clone().ok_or(LocationError::NoCurrentFile)?,
        };
        let line = match line {
            None => None,
            Some(LineRef::Absolute(line)) => Some(*line),
            Some(LineRef::Delta(delta)) => {
                let resolved = i64::from(cursor.last_line(&file)) + delta;
                let line = u32::try_from(resolved).map_err(|_| LocationError::LineOutOfRange {
                    file: file.clone(),
                    line: resolved,
                })?;
                Some(line)
            },
        };

        if let Some(line) = line {
            cursor.last_lines.insert(file.clone(), line);
        }
        if first_file.is_none() {
            first_file = Some(file.clone());
        }
        local_file = Some(file.clone());
        decoded.push(Location::File { file, line });
    }

    if first_file.is_some() {
        cursor.current_file = first_file;
    }
    Ok((decoded, cursor))
}

/// Encodes a standalone location list.
pub fn encode(locations: &[Location]) -> Vec<EncodedLocation> {
    encode_with(LocationCursor::new(), locations).0
}

/// Decodes a standalone location list; the inverse of [`encode`].
pub fn decode(encoded: &[EncodedLocation]) -> Result<Vec<Location>, LocationError> {
    decode_with(LocationCursor::new(), encoded).map(|(locations, _)| locations)
}

/// Absolute encoding: every entry names its file and line.
pub fn encode_absolute(locations: &[Location]) -> Vec<EncodedLocation> {
    locations
        .iter()
        .map(|location| match location {
            Location::Anonymous => EncodedLocation::Anonymous,
            Location::File { file, line } => EncodedLocation::Entry {
                file: Some(file.clone()),
                line: line.map(LineRef::Absolute),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(file: Option<&str>, line: Option<LineRef>) -> EncodedLocation {
        EncodedLocation::Entry {
            file: file.map(str::to_string),
            line,
        }
    }

    #[test]
    fn test_same_file_uses_deltas() {
        let locations = vec![
            Location::file_line("f", 10),
            Location::file_line("f", 15),
            Location::file_line("f", 15),
            Location::file_line("g", 3),
        ];
        let encoded = encode(&locations);
        assert_eq!(
            encoded,
            vec![
                entry(Some("f"), Some(LineRef::Absolute(10))),
                entry(None, Some(LineRef::Delta(5))),
                entry(None, Some(LineRef::Delta(0))),
                entry(Some("g"), Some(LineRef::Absolute(3))),
            ]
        );
        assert_eq!(decode(&encoded).unwrap(), locations);
    }

    #[test]
    fn test_anonymous_is_not_inherit() {
        let locations = vec![
            Location::file_line("a.cpp", 4),
            Location::Anonymous,
            Location::file_only("a.cpp"),
        ];
        let encoded = encode(&locations);
        assert_eq!(encoded[1], EncodedLocation::Anonymous);
        assert_eq!(encoded[2], entry(None, None));
        assert_eq!(decode(&encoded).unwrap(), locations);
    }

    #[test]
    fn test_cursor_carries_across_messages() {
        let first = vec![Location::file_line("a.cpp", 10), Location::file_line("b.cpp", 2)];
        let second = vec![Location::file_line("a.cpp", 30), Location::file_line("b.cpp", 1)];

        let (enc_first, cursor) = encode_with(LocationCursor::new(), &first);
        let (enc_second, _) = encode_with(cursor, &second);
        // The second message starts from a.cpp, the first file of the previous one.
        assert_eq!(enc_second[0], entry(None, Some(LineRef::Delta(20))));
        assert_eq!(enc_second[1], entry(Some("b.cpp"), Some(LineRef::Absolute(1))));

        let (dec_first, cursor) = decode_with(LocationCursor::new(), &enc_first).unwrap();
        let (dec_second, cursor) = decode_with(cursor, &enc_second).unwrap();
        assert_eq!(dec_first, first);
        assert_eq!(dec_second, second);
        assert_eq!(cursor.current_file(), Some("a.cpp"));
    }

    #[test]
    fn test_foreign_relative_files_decode() {
        // Each file starts at line 0 and deltas are per file.
        let encoded = vec![
            entry(Some("main.cpp"), Some(LineRef::Delta(12))),
            entry(Some("util.cpp"), Some(LineRef::Delta(40))),
            entry(Some("main.cpp"), Some(LineRef::Delta(3))),
        ];
        assert_eq!(
            decode(&encoded).unwrap(),
            vec![
                Location::file_line("main.cpp", 12),
                Location::file_line("util.cpp", 40),
                Location::file_line("main.cpp", 15),
            ]
        );
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode(&[entry(None, Some(LineRef::Absolute(1)))]),
            Err(LocationError::NoCurrentFile)
        );
        assert_eq!(
            decode(&[entry(Some("x"), Some(LineRef::Delta(-1)))]),
            Err(LocationError::LineOutOfRange {
                file: "x".to_string(),
                line: -1
            })
        );
    }

    #[test]
    fn test_absolute_encoding_roundtrip() {
        let locations = vec![Location::file_line("f", 9), Location::file_line("f", 2)];
        let encoded = encode_absolute(&locations);
        assert_eq!(encoded[1], entry(Some("f"), Some(LineRef::Absolute(2))));
        assert_eq!(decode(&encoded).unwrap(), locations);
    }

    #[rstest]
    #[case("12", LineRef::Absolute(12))]
    #[case("+3", LineRef::Delta(3))]
    #[case("-7", LineRef::Delta(-7))]
    #[case("+0", LineRef::Delta(0))]
    fn test_line_ref_parse_display(#[case] text: &str, #[case] expected: LineRef) {
        assert_eq!(text.parse::<LineRef>().unwrap(), expected);
        assert_eq!(expected.to_string(), text);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("+")]
    #[case("-4294967296x")]
    fn test_line_ref_rejects(#[case] text: &str) {
        assert!(text.parse::<LineRef>().is_err());
    }
}

#![allow(dead_code)] // Functions used by different test binaries appear unused per-binary

//! Shared builders for tsync integration tests.

use tsync::merge::ExtractedMessage;
use tsync::model::{Catalog, Location, Message, Status, Translation};

/// A finished single-form message.
pub fn finished(source: &str, text: &str) -> Message {
    let mut message = Message::new(source);
    message.translation = Translation::Single(text.to_string());
    message.status = Status::Finished;
    message
}

/// A message with the given status and translation.
pub fn message(source: &str, translation: Translation, status: Status) -> Message {
    let mut message = Message::new(source);
    message.translation = translation;
    message.status = status;
    message
}

/// Builds a catalog from `(context, message)` pairs, in order.
pub fn catalog(language: &str, messages: Vec<(&str, Message)>) -> Catalog {
    let mut catalog = Catalog::new(Some(language.to_string()));
    for (context, message) in messages {
        catalog.context_mut_or_insert(context).messages.push(message);
    }
    catalog
}

/// An extracted message with a single `file:line` location.
pub fn extracted(context: &str, source: &str, file: &str, line: u32) -> ExtractedMessage {
    ExtractedMessage::new(context, source).with_locations(vec![Location::file_line(file, line)])
}

/// A catalog exercising every field of the model.
pub fn rich_catalog() -> Catalog {
    let mut catalog = Catalog::new(Some("fr_FR".to_string()));
    catalog.source_language = Some("en".to_string());

    let mut open = finished("&Open...", "&Ouvrir...");
    open.locations = vec![
        Location::file_line("../src/mainwindow.cpp", 120),
        Location::file_line("../src/mainwindow.cpp", 96),
        Location::file_only("../forms/mainwindow.ui"),
    ];
    open.extra_comment = Some("File menu".to_string());

    let mut delete_menu = finished("Delete", "Supprimer");
    delete_menu.comment = "menu".to_string();
    delete_menu.locations = vec![Location::file_line("../src/mainwindow.cpp", 130)];

    let mut delete_key = message("Delete", Translation::Single(String::new()), Status::Unfinished);
    delete_key.comment = "key name".to_string();
    delete_key.translator_comment = Some("Short form needed".to_string());
    delete_key.locations = vec![Location::Anonymous];

    let mut files = message(
        "%n file(s) <selected>",
        Translation::Plural(vec!["%n fichier".to_string(), "%n fichiers".to_string()]),
        Status::Finished,
    );
    files.locations = vec![
        Location::file_line("../src/filelist.cpp", 12),
        Location::file_line("../src/mainwindow.cpp", 140),
    ];

    let mut old = message(
        "Line one\r\nline \"two\" & 'three'",
        Translation::Single("Ancien\u{7}".to_string()),
        Status::Obsolete,
    );
    old.extras = vec![tsync::model::Extra {
        name: "extra-po-flags".to_string(),
        value: "c-format".to_string(),
    }];

    let mut gone = message("Gone", Translation::Single("Disparu".to_string()), Status::Vanished);
    gone.locations = vec![Location::file_line("../src/legacy.cpp", 3)];

    catalog.context_mut_or_insert("MainWindow").messages.extend([
        open,
        delete_menu,
        delete_key,
        files,
    ]);
    catalog
        .context_mut_or_insert("Legacy")
        .messages
        .extend([old, gone]);
    catalog
}

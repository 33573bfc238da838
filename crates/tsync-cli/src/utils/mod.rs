//! Utility functions shared across CLI commands.

mod discovery;
pub mod ui;

pub use discovery::collect_files;

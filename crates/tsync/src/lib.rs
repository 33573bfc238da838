#![doc = include_str!("../README.md")]

pub mod error;
pub mod location;
pub mod merge;
pub mod model;
pub mod plural;
pub mod translate;
pub mod ts;
pub mod validate;

pub use error::ParseError;
pub use merge::{ExtractedMessage, MergeOptions, MergeOutcome, merge};
pub use model::{Catalog, Context, Location, Message, Status, Translation};
pub use translate::Translator;
pub use validate::{Finding, Severity, ValidationOptions, validate};

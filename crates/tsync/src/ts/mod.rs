//! Reading and writing the TS XML catalog format.
//!
//! [`serialize`] always produces the same bytes for the same catalog:
//! contexts and messages in model order, fixed indentation, relative
//! locations. Parsing that output yields an equal catalog.

mod parse;
mod serialize;

pub use parse::{SUPPORTED_VERSIONS, parse};
pub use serialize::{SerializeOptions, escape_text, serialize, serialize_with, write_to};

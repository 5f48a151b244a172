//! Canonical SBML Level 3 writer.
//!
//! Build a [`Document`] in memory, then serialize it with
//! [`write_sbml_to_string`] or [`write_sbml`]. Output is deterministic:
//! schema-ordered elements and attributes, two-space indentation, and
//! locale-independent numbers (`NaN`, `INF`, `-INF` for the special values).
//! Targets ending in `.gz`, `.zip` or `.bz2` are compressed.
//!
//! Failures never panic or return `Err` from the public entry points; they
//! are appended to the document's [`ErrorLog`].
//!
//! [`read_sbml`] loads documents back, which makes write, read, write
//! round-trips possible.

pub mod error;
pub mod generator;
pub mod math;
pub mod model;
pub mod parser;

pub use error::{ErrorCode, ErrorLog, SbmlError, Severity};
pub use generator::{
    SbmlElement, SbmlWriter, WriteContext, has_bzip2, has_zlib, write_sbml,
    write_sbml_to_string,
};
pub use math::{AstNode, parse_formula};
pub use model::*;
pub use parser::{read_sbml, read_sbml_from_string};

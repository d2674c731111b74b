//! Notation parsing: token grammar, line assembly, track accumulation,
//! document scanning, and checksum validation.
//!
//! [`parse`] drives the whole pipeline. Each pattern line is tokenized by
//! [`token`], placed by [`line`], and folded into its track by [`track`];
//! once the document ends, [`check`] cross-validates every track against
//! the `%%CHECK:` manifest.

pub mod check;
pub mod error;
pub mod line;
pub mod parser;
pub mod token;
pub mod track;

pub use error::{ChecksumError, ErrorKind, ParseError, SyntaxError};
pub use parser::parse;

//! Error types for notation parsing and validation.

use std::fmt;

/// Which rule a fail-fast error broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Document shape: headers, line forms, check-block fencing.
    Structure,
    /// Token grammar.
    Grammar,
    /// Step arithmetic: line lengths and bar alignment.
    Arithmetic,
}

/// A fail-fast parse error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// 1-based source line, once the document parser has attached it.
    pub line: Option<usize>,
    pub kind: ErrorKind,
}

impl SyntaxError {
    pub fn structure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            kind: ErrorKind::Structure,
        }
    }

    pub fn grammar(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            kind: ErrorKind::Grammar,
        }
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            kind: ErrorKind::Arithmetic,
        }
    }

    /// Attach the source line the error was found on.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[line {line}] {:?}: {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// One violation found while cross-checking the `%%CHECK:` manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    /// The declared total disagrees with the parsed total.
    Mismatch {
        key: String,
        declared: u32,
        computed: u32,
    },
    /// A track has no `<name>_Total` entry.
    MissingKey { track: String, key: String },
    /// An entry names no track in the document.
    UnknownKey { key: String },
}

impl fmt::Display for ChecksumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumError::Mismatch {
                key,
                declared,
                computed,
            } => write!(
                f,
                "{key}: declared {declared} steps but the document holds {computed}"
            ),
            ChecksumError::MissingKey { track, key } => {
                write!(f, "track '{track}' has no check entry '{key}'")
            }
            ChecksumError::UnknownKey { key } => {
                write!(f, "check entry '{key}' matches no track")
            }
        }
    }
}

impl std::error::Error for ChecksumError {}

/// Why a document was rejected: the first syntax error hit, or every
/// checksum violation found once the document parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Syntax(SyntaxError),
    /// Never empty.
    Validation(Vec<ChecksumError>),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(e) => write!(f, "{e}"),
            ParseError::Validation(errors) => {
                write!(f, "check failed with {} error(s):", errors.len())?;
                for e in errors {
                    write!(f, "\n  {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<SyntaxError> for ParseError {
    fn from(e: SyntaxError) -> Self {
        ParseError::Syntax(e)
    }
}

//! Error records accumulated on a [`Document`](crate::model::Document).
//!
//! Nothing in the public API panics or returns `Err` because a file could not
//! be written or read. Operations report success as a `bool` (or hand back a
//! document) and leave an [`SbmlError`] in the document's [`ErrorLog`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifiers for everything that can end up in an [`ErrorLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    XmlUnknownError,
    XmlFileUnreadable,
    XmlFileUnwritable,
    XmlFileOperationError,
    /// A compressed target was requested but the codec was not compiled in.
    CompressionUnsupported,
    BadlyFormedXml,
    /// An attribute value that does not parse as its declared type.
    InvalidAttributeValue,
    MathParseError,
    InvalidUnitKind,
    InvalidLevelVersion,
    InvalidNamespace,
    UnknownElement,
}

impl ErrorCode {
    /// Numeric id of the code. These values never change between releases.
    pub fn id(self) -> u32 {
        match self {
            ErrorCode::XmlUnknownError => 0,
            ErrorCode::XmlFileUnreadable => 2,
            ErrorCode::XmlFileUnwritable => 3,
            ErrorCode::XmlFileOperationError => 4,
            ErrorCode::CompressionUnsupported => 5,
            ErrorCode::BadlyFormedXml => 1006,
            ErrorCode::InvalidAttributeValue => 1019,
            ErrorCode::MathParseError => 10201,
            ErrorCode::InvalidUnitKind => 10311,
            ErrorCode::InvalidLevelVersion => 20102,
            ErrorCode::InvalidNamespace => 20103,
            ErrorCode::UnknownElement => 99101,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            ErrorCode::UnknownElement => Severity::Warning,
            ErrorCode::XmlFileUnreadable | ErrorCode::BadlyFormedXml => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// One logged problem. `line` and `column` are 1-based and zero when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SbmlError {
    pub code: ErrorCode,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SbmlError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line: 0,
            column: 0,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for SbmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}:{}: ", self.line, self.column)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Ordered list of errors attached to a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    errors: Vec<SbmlError>,
}

impl ErrorLog {
    pub fn add(&mut self, error: SbmlError) {
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SbmlError> {
        self.errors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SbmlError> {
        self.errors.iter()
    }

    /// Number of entries at or above the given severity.
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.errors
            .iter()
            .filter(|e| e.severity() >= severity)
            .count()
    }

    pub fn contains(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

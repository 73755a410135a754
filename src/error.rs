//! All error types for the localetree crate.
//!
//! Loading returns [`Error`]; formatting a localized template returns
//! [`FormatError`](crate::format::FormatError), which converts into [`Error`]
//! when callers want a single error type.

use thiserror::Error;

use crate::format::FormatError;

#[derive(Error, Debug)]
pub enum Error {
    /// The API was used in the wrong order, e.g. loading before a target
    /// language was set.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The document is well-formed XML but does not follow the `I18N` layout.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(#[from] FormatError),
}

impl Error {
    /// Creates a new parse error for the element found at `line`.
    pub fn parse_error(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    /// Creates a new configuration error
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Source line of the offending element, for parse errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}

use std::{error::Error as StdError, fmt};

/// Anything that could go wrong while loading a beatmap document.
///
/// None of these are fatal: info loading returns them to the caller, difficulty
/// loading attaches them to a default document.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadError {
    /// The file was missing, unreadable or empty.
    NoDocument,
    /// The text is not a JSON object.
    Parse {
        message: String,
        line: usize,
        column: usize,
    },
    /// No supported schema could make sense of the document.
    UnsupportedVersion,
}

impl LoadError {
    pub(crate) fn parse(err: &serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => f.write_str("document is missing or empty"),
            Self::Parse {
                message,
                line,
                column,
            } => write!(f, "malformed document at {}:{}: {}", line, column, message),
            Self::UnsupportedVersion => f.write_str("document is in a missing or unsupported version"),
        }
    }
}

impl StdError for LoadError {}

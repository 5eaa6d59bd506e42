//! Error types for the symbol pipeline.
//!
//! Three fatal kinds, no recovery paths: this is a one-shot batch transform
//! and any failure aborts the run before output files are finalized.

use std::fmt;
use std::path::PathBuf;

/// Errors raised while mining symbols and generating definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// The input artifact (static library or symbol dump) does not exist.
    MissingInput(PathBuf),
    /// A line does not conform to the symbol grammar, or a decoded
    /// character sequence is not a valid string encoding.
    MalformedSymbolLine { line: String, reason: String },
    /// A parsed symbol whose trailing member is not `to_id`, `offset` or
    /// `value_store`.
    UnrecognizedMember { member: String },
}

impl SymbolError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        SymbolError::MalformedSymbolLine {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::MissingInput(path) => {
                write!(f, "input file not found: {}", path.display())
            }
            SymbolError::MalformedSymbolLine { line, reason } => {
                write!(f, "malformed symbol line ({}): {}", reason, line)
            }
            SymbolError::UnrecognizedMember { member } => {
                write!(f, "unrecognized trailing member: {}", member)
            }
        }
    }
}

impl std::error::Error for SymbolError {}

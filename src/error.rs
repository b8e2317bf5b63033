//! use pkitool::error::{ConfigError, PkiToolError};

use std::path::PathBuf;

use thiserror::Error;

use crate::config::Document;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, PkiToolError>;

/// A single line the parser could not classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadLine {
    /// 1-based line number.
    pub line_number: usize,
    /// The line as it appeared in the input, without its terminator.
    pub raw: String,
}

/// One or more lines of an openssl.cnf file were neither blank, a comment,
/// a continuation, a section header nor an assignment.
///
/// Every well-formed line of the input was still applied; the resulting
/// document is kept here so callers may decide to proceed with it.
#[derive(Debug, Clone)]
pub struct FormatError {
    pub lines: Vec<BadLine>,
    pub document: Box<Document>,
}

impl FormatError {
    /// Gives up on the error and takes the partially-parsed document.
    pub fn into_document(self) -> Document {
        *self.document
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} malformed line(s):", self.lines.len())?;
        for bad in &self.lines {
            write!(f, "\n\t[line {:2}]: {:?}", bad.line_number, bad.raw)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormatError {}

/// Errors raised while reading or resolving a configuration document.
///
/// None of these leave the document modified.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The input contained lines that could not be parsed.
    #[error("Invalid configuration: {0}")]
    Format(FormatError),

    /// Lookup against a section that does not exist.
    #[error("No section: {0:?}")]
    NoSection(String),

    /// Lookup of an option missing from its section and from the defaults.
    #[error("No option {option:?} in section {section:?}")]
    NoOption { section: String, option: String },

    /// A `$ENV::NAME` reference to an unset environment variable.
    #[error("Environment variable {0:?} is not set")]
    EnvironmentLookup(String),
}

/// Represents errors that can occur while bootstrapping a CA.
#[derive(Debug, Error)]
pub enum PkiToolError {
    /// Reading or resolving the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Error during key encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// A callback name outside the allow-list.
    #[error("Callback {0} is not a known callback")]
    UnknownCallback(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PkiToolError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PkiToolError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<rsa::Error> for PkiToolError {
    fn from(err: rsa::Error) -> Self {
        PkiToolError::KeyGeneration(err.to_string())
    }
}

impl From<pkcs8::Error> for PkiToolError {
    fn from(err: pkcs8::Error) -> Self {
        PkiToolError::EncodingError(err.to_string())
    }
}

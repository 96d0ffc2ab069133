//! Error types for the expense-export library.
//!
//! Internally, functions return `Res<T>`, which is an `anyhow::Result`. At the public boundary,
//! errors are converted with `pub_result` into the crate's `Error`, which carries an `ErrorType`
//! so that callers can tell which stage of the pipeline failed.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of failure that aborted the run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The source database file is missing or cannot be opened as SQLite.
    SourceUnavailable,
    /// The source database does not have the expected tables or columns.
    SchemaMismatch,
    /// One or more credentials required by the spreadsheet sink are absent.
    MissingCredentials,
    /// The spreadsheet document is invalid or not shared with the service account.
    DocumentUnavailable,
    /// The spreadsheet document has no worksheet with the requested title.
    WorksheetNotFound,
    /// Any other failure while talking to the spreadsheet service.
    RemoteFailure,
    /// The CSV output file could not be written.
    OutputFailure,
}

serde_plain::derive_display_from_serialize!(ErrorType);

/// The public error type. It wraps the `anyhow` chain that describes what went wrong and tags it
/// with an `ErrorType`.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub(crate) fn new(error_type: ErrorType, inner: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: inner.into(),
        }
    }

    /// Create an `Error` from a message.
    pub(crate) fn msg(error_type: ErrorType, message: impl Display) -> Self {
        Self::new(error_type, anyhow::anyhow!("{message}"))
    }

    /// The kind of failure.
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Converts an internal result into the public `Result` by tagging the error with an `ErrorType`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_type_display() {
        assert_eq!("source_unavailable", ErrorType::SourceUnavailable.to_string());
        assert_eq!("worksheet_not_found", ErrorType::WorksheetNotFound.to_string());
    }

    #[test]
    fn test_pub_result_keeps_context_chain() {
        let res: Res<()> = Err(anyhow::anyhow!("disk full")).context("Unable to write out.csv");
        let err = res.pub_result(ErrorType::OutputFailure).unwrap_err();
        assert_eq!(ErrorType::OutputFailure, err.error_type());
        assert_eq!("Unable to write out.csv: disk full", err.to_string());
    }
}

//! Error types for pdfcsv.
//!
//! Only fatal conditions are errors. Per-row problems (rows that cannot be
//! aligned to the schema, rows that fail validation) are reported through
//! [`RowOutcome`](crate::model::RowOutcome) and the result counters instead.

use std::io;
use thiserror::Error;

/// Result type alias for pdfcsv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a conversion run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the document or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries an unsupported version.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF structure could not be parsed.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The document is encrypted and no password was supplied.
    #[error("Document is encrypted")]
    Encrypted,

    /// The supplied password does not decrypt the document.
    #[error("Invalid password")]
    InvalidPassword,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// The column configuration is contradictory.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A configured regex pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The interactive prompt could not supply an answer.
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The CSV sink failed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the document itself could not be opened.
    pub fn is_document_open(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::UnsupportedVersion(_)
                | Error::PdfParse(_)
                | Error::Encrypted
                | Error::InvalidPassword
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(e) = err.into_kind() {
                return Error::Io(e);
            }
            return Error::Csv("I/O failure".to_string());
        }
        Error::Csv(err.to_string())
    }
}

//! Error types for the imba library.

use std::io;
use thiserror::Error;

/// Result type alias for imba operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading workbooks or writing output.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input could not be recognized as a workbook.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the workbook.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required workbook part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Year or cycle outside the recognized range.
    #[error("Invalid cycle: {0}")]
    InvalidCycle(String),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Error during rendering.
    #[error("Render error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format");

        let err = Error::UnsupportedFormat("legacy .xls".to_string());
        assert_eq!(err.to_string(), "Unsupported format: legacy .xls");

        let err = Error::InvalidCycle("cycle 21 outside 1..=20".to_string());
        assert_eq!(err.to_string(), "Invalid cycle: cycle 21 outside 1..=20");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_zip() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::ZipArchive(_)));
    }
}

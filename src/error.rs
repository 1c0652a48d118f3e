use thiserror::Error as ThisError;

/// Errors that can occur in the logging library
#[derive(ThisError, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Level text did not name a known severity.
    #[error("unrecognized level {0:?}")]
    ParseLevel(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

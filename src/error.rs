use std::io;
use thiserror::Error;

/// type alias for all operations on a [`ClientEngine`] that could fail with a [`CrsError`]
///
/// [`ClientEngine`]: ./engine/trait.ClientEngine.html
pub type Result<T> = std::result::Result<T, CrsError>;

/// The Error variants used by the crs engines, server and client.
#[derive(Error, Debug)]
pub enum CrsError {
    /// a required field was missing or empty, or a field had the wrong JSON type
    #[error("{0}")]
    Validation(String),

    /// the resolution key did not match any record
    #[error("{0}")]
    NotFound(String),

    /// a record with the same identity already exists
    #[error("{0}")]
    Conflict(String),

    /// errors caused from file or network IO
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// serde_json (de)serialization errors
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// command line arguments or configuration values that could not be parsed
    #[error("parsing error: {0}")]
    Parsing(String),

    /// an error message received from a remote crs-server
    #[error("{0}")]
    StringErr(String),
}

impl CrsError {
    /// the status code a request handler reports for this error
    pub fn status(&self) -> u16 {
        match self {
            CrsError::Validation(_) => 400,
            CrsError::NotFound(_) => 404,
            CrsError::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// rebuilds a typed error from a `status` code and `message` received over the wire
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => CrsError::Validation(message),
            404 => CrsError::NotFound(message),
            409 => CrsError::Conflict(message),
            _ => CrsError::StringErr(message),
        }
    }
}

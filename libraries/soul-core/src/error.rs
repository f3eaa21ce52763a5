/// Core error types for the Soul library manager
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using `SoulError`
pub type Result<T> = std::result::Result<T, SoulError>;

/// Core error type for library operations
#[derive(Error, Debug)]
pub enum SoulError {
    /// Metadata parsing or writing errors
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Song not found in the library
    #[error("Song not found: {}", .0.display())]
    SongNotFound(PathBuf),

    /// Target path is already taken
    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// File is locked or otherwise not accessible right now
    #[error("File is in use: {}", .0.display())]
    FileLocked(PathBuf),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SoulError {
    /// Create a metadata error
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Errors raised by identification and metadata services
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The service refuses further requests for now
    ///
    /// This is fatal for the remaining items of the task that hit it.
    #[error("Rate limited by identification service")]
    RateLimited {
        /// Hint from the service, if it sent one
        retry_after: Option<Duration>,
    },

    /// The service answered but knows nothing about the song
    #[error("No match found")]
    NoMatch,

    /// Any other lookup failure for this one song
    #[error("Lookup failed: {0}")]
    Lookup(String),
}

impl LookupError {
    /// Create a generic lookup failure
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Whether this error should abort the rest of the task
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Librarian error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LibrarianError>;

#[derive(Debug, Error)]
pub enum LibrarianError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Library error: {0}")]
    Library(#[from] soul_core::SoulError),

    #[error("Queue error: {0}")]
    Queue(#[from] soul_tasks::QueueError),

    #[error("Nothing to do: {0}")]
    NothingToDo(String),
}

impl From<config::ConfigError> for LibrarianError {
    fn from(err: config::ConfigError) -> Self {
        LibrarianError::Config(err.to_string())
    }
}

//! Soul Librarian
//!
//! Wires the file-system library, the offline identifier and the task queue
//! together for the `soul-librarian` binary.

pub mod app;
pub mod config;
pub mod error;
pub mod report;

pub use app::Librarian;
pub use config::LibrarianConfig;
pub use error::{LibrarianError, Result};

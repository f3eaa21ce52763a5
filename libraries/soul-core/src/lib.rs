//! Soul Library Core
//!
//! Platform-agnostic domain types, collaborator traits and error handling
//! shared by the background task queue and its library implementations.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `SongMetadata`, `SortAttribute`, `SortSettings`
//! - **Collaborator Traits**: `Library`, `Fingerprinter`, `MetadataProvider`, `SettingsProvider`
//! - **Error Handling**: Unified `SoulError` and `Result` types, plus `LookupError`
//!   for identification services
//!
//! # Example
//!
//! ```rust
//! use soul_core::{Song, SongMetadata, SortAttribute};
//! use std::path::PathBuf;
//!
//! let mut song = Song::new(PathBuf::from("/music/song.mp3"));
//! song.metadata.artist = Some("Queen".to_string());
//!
//! assert_eq!(
//!     song.metadata.attribute(SortAttribute::Artist).as_deref(),
//!     Some("Queen")
//! );
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LookupError, Result, SoulError};
pub use events::LibraryEvent;
pub use traits::{Fingerprinter, Library, MetadataProvider, SettingsProvider};
pub use types::{ImportAction, Song, SongMetadata, SortAttribute, SortSettings};

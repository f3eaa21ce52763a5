//! Soul Library
//!
//! Concrete collaborators for the task queue:
//!
//! - `FsLibrary`: the `Library` trait over the real file system, with tags
//!   read and written through lofty
//! - `scanner`: expansion of folders into audio files
//! - `FilenameIdentifier`: offline identification from file names
//! - `ImportWatcher`: drop-folder watching with debounced batches
//!
//! # Example
//!
//! ```rust,no_run
//! use soul_core::Library;
//! use soul_library::FsLibrary;
//!
//! # async fn example() -> soul_core::Result<()> {
//! let library = FsLibrary::new("/music")?;
//! for song in library.all_songs().await? {
//!     println!("{}", song.path.display());
//! }
//! # Ok(())
//! # }
//! ```

mod fs_library;
mod identifier;

pub mod scanner;
pub mod tags;
pub mod watcher;

pub use fs_library::FsLibrary;
pub use identifier::FilenameIdentifier;
pub use scanner::{collect_audio_files, is_audio_file};
pub use watcher::ImportWatcher;

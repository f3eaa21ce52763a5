mod library_settings;
mod song;

pub use library_settings::{ImportAction, SortAttribute, SortSettings};
pub use song::{Song, SongMetadata};

//! Library organization settings
//!
//! Controls where imported files land and how the sorter lays them out.

use crate::error::{Result, SoulError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Metadata attribute the library can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAttribute {
    /// Album artist, falling back to the track artist
    AlbumArtist,
    /// Track artist
    Artist,
    /// Album title
    Album,
    /// Genre
    Genre,
    /// Release year
    Year,
}

impl SortAttribute {
    /// Folder name used when a song has no value for this attribute
    pub fn fallback(&self) -> &'static str {
        match self {
            Self::AlbumArtist | Self::Artist => "Unknown Artist",
            Self::Album => "Unknown Album",
            Self::Genre => "Unknown Genre",
            Self::Year => "0000",
        }
    }
}

impl std::fmt::Display for SortAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AlbumArtist => "album_artist",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Genre => "genre",
            Self::Year => "year",
        };
        write!(f, "{name}")
    }
}

/// What to do with the original when importing a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    /// Copy files (preserve originals)
    #[default]
    Copy,
    /// Move files (remove originals)
    Move,
}

impl std::fmt::Display for ImportAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// Settings the sorter reads when it is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSettings {
    /// Root folder of the managed library
    pub library_root: PathBuf,

    /// Folder levels, outermost first
    #[serde(default = "default_attribute_order")]
    pub attribute_order: Vec<SortAttribute>,
}

fn default_attribute_order() -> Vec<SortAttribute> {
    vec![SortAttribute::AlbumArtist, SortAttribute::Album]
}

impl SortSettings {
    /// Create settings with the default attribute order
    pub fn new(library_root: impl Into<PathBuf>) -> Self {
        Self {
            library_root: library_root.into(),
            attribute_order: default_attribute_order(),
        }
    }

    /// Replace the attribute order
    #[must_use]
    pub fn with_order(mut self, attribute_order: Vec<SortAttribute>) -> Self {
        self.attribute_order = attribute_order;
        self
    }

    /// Check the root is usable and no attribute repeats
    pub fn validate(&self) -> Result<()> {
        if self.library_root.as_os_str().is_empty() {
            return Err(SoulError::invalid_input("library root is not set"));
        }
        if !self.library_root.is_absolute() {
            return Err(SoulError::invalid_input(format!(
                "library root must be absolute: {}",
                self.library_root.display()
            )));
        }
        if self.attribute_order.is_empty() {
            return Err(SoulError::invalid_input("sort attribute order is empty"));
        }

        let mut seen = HashSet::new();
        for attribute in &self.attribute_order {
            if !seen.insert(attribute) {
                return Err(SoulError::invalid_input(format!(
                    "sort attribute listed twice: {attribute}"
                )));
            }
        }
        Ok(())
    }
}

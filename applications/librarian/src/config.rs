/// Librarian configuration
use crate::error::{LibrarianError, Result};
use serde::{Deserialize, Serialize};
use soul_core::{ImportAction, SortAttribute, SortSettings};
use soul_tasks::{FollowUpPolicy, QueueConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "librarian.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarianConfig {
    /// Root folder of the managed library
    #[serde(default)]
    pub library_root: PathBuf,

    /// Folder levels the sorter creates, outermost first
    #[serde(default = "default_attribute_order")]
    pub attribute_order: Vec<SortAttribute>,

    #[serde(default)]
    pub import_action: ImportAction,

    /// Let identification replace existing tags
    #[serde(default)]
    pub overwrite_tags: bool,

    /// Folders watched by `watch`
    #[serde(default)]
    pub drop_folders: Vec<PathBuf>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub follow_ups: FollowUpPolicy,
}

impl LibrarianConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `librarian.toml` is used when
    /// present. `SOUL_`-prefixed variables override the file, with `__`
    /// separating nested keys (`SOUL_QUEUE__MAX_CONCURRENT_TASKS`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SOUL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.library_root.as_os_str().is_empty() {
            return Err(LibrarianError::Config(
                "Library root is required (set SOUL_LIBRARY_ROOT)".to_string(),
            ));
        }
        self.sort_settings()
            .validate()
            .map_err(|e| LibrarianError::Config(e.to_string()))?;

        if self.debounce_ms == 0 {
            return Err(LibrarianError::Config(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }
        let nested = self
            .drop_folders
            .iter()
            .find(|folder| folder.starts_with(&self.library_root));
        if let Some(folder) = nested {
            return Err(LibrarianError::Config(format!(
                "Drop folder {} is inside the library",
                folder.display()
            )));
        }
        Ok(())
    }

    pub fn sort_settings(&self) -> SortSettings {
        SortSettings::new(&self.library_root).with_order(self.attribute_order.clone())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// Default values
fn default_attribute_order() -> Vec<SortAttribute> {
    vec![SortAttribute::AlbumArtist, SortAttribute::Album]
}

fn default_debounce_ms() -> u64 {
    2000
}

impl Default for LibrarianConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::new(),
            attribute_order: default_attribute_order(),
            import_action: ImportAction::default(),
            overwrite_tags: false,
            drop_folders: Vec::new(),
            debounce_ms: default_debounce_ms(),
            queue: QueueConfig::default(),
            follow_ups: FollowUpPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("librarian.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
                library_root = "/srv/music"
                attribute_order = ["genre", "artist", "album"]
                import_action = "move"
                overwrite_tags = true
                drop_folders = ["/srv/inbox"]

                [queue]
                max_concurrent_tasks = 2

                [follow_ups]
                sort_after_import = false
            "#,
        );

        let config = LibrarianConfig::load(Some(&path)).unwrap();
        config.validate().unwrap();

        assert_eq!(config.library_root, PathBuf::from("/srv/music"));
        assert_eq!(
            config.attribute_order,
            vec![
                SortAttribute::Genre,
                SortAttribute::Artist,
                SortAttribute::Album
            ]
        );
        assert_eq!(config.import_action, ImportAction::Move);
        assert!(config.overwrite_tags);
        assert_eq!(config.queue.max_concurrent_tasks, 2);
        assert_eq!(config.queue.event_capacity, QueueConfig::default().event_capacity);
        assert!(config.follow_ups.identify_after_import);
        assert!(!config.follow_ups.sort_after_import);
        assert_eq!(config.debounce(), Duration::from_secs(2));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = LibrarianConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(LibrarianError::Config(_))));
    }

    #[test]
    fn test_validation() {
        let config = LibrarianConfig::default();
        assert!(config.validate().is_err());

        let config = LibrarianConfig {
            library_root: PathBuf::from("/srv/music"),
            ..LibrarianConfig::default()
        };
        assert!(config.validate().is_ok());

        let relative = LibrarianConfig {
            library_root: PathBuf::from("music"),
            ..config.clone()
        };
        assert!(relative.validate().is_err());

        let repeated = LibrarianConfig {
            attribute_order: vec![SortAttribute::Album, SortAttribute::Album],
            ..config.clone()
        };
        assert!(repeated.validate().is_err());

        let nested_drop = LibrarianConfig {
            drop_folders: vec![PathBuf::from("/srv/music/inbox")],
            ..config
        };
        assert!(nested_drop.validate().is_err());
    }
}

//! The concrete task kinds

mod identifier;
mod importer;
mod sorter;

pub use identifier::IdentifyTask;
pub use importer::ImportTask;
pub use sorter::{SortScope, SortTask};

use crate::error::TaskError;
use soul_core::Library;
use std::path::{Component, Path, PathBuf};

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Attempts when a destination is taken between lookup and transfer
const TRANSFER_ATTEMPTS: usize = 3;

/// First free path for `target`, trying `name-1.ext`, `name-2.ext`, ...
///
/// `current` is the file being placed; its own path counts as free.
pub(crate) async fn free_path(
    library: &dyn Library,
    target: &Path,
    current: Option<&Path>,
) -> Result<PathBuf, TaskError> {
    if Some(target) == current || !library.file_exists(target).await {
        return Ok(target.to_path_buf());
    }

    let stem = target
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let extension = target.extension().and_then(|e| e.to_str());

    for counter in 1..=MAX_NAME_ATTEMPTS {
        let name = match extension {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{stem}-{counter}"),
        };
        let candidate = target.with_file_name(name);
        if Some(candidate.as_path()) == current || !library.file_exists(&candidate).await {
            return Ok(candidate);
        }
    }

    Err(TaskError::NoFreeName(target.to_path_buf()))
}

/// Remember the first per-item error for the task summary
fn note_error(first: &mut Option<String>, error: &TaskError) {
    if first.is_none() {
        *first = Some(error.to_string());
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically
///
/// Relative paths are taken from the working directory. Symbolic links are
/// not followed.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return resolve_dots(path);
    }
    match std::env::current_dir() {
        Ok(dir) => resolve_dots(&dir.join(path)),
        Err(_) => resolve_dots(path),
    }
}

fn resolve_dots(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root
                if !resolved.pop() && !path.has_root() {
                    resolved.push(component);
                }
            }
            other => resolved.push(other),
        }
    }
    resolved
}

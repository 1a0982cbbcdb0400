use std::fs::{self, File};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::LabelError;

/// Files directly under `root` with the given extension (case-insensitive), sorted.
///
/// Subdirectories are not descended into. Unreadable entries are skipped.
pub fn files_with_extension(root: &Path, extension: &str) -> Result<Vec<PathBuf>, LabelError> {
    if !root.is_dir() {
        return Err(LabelError::Configuration(format!(
            "input directory {} does not exist",
            root.display()
        )));
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Create the parent directory of `path` when it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), LabelError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Create (or truncate) an output file, creating its parent directory first.
pub fn create_output(path: &Path) -> Result<File, LabelError> {
    ensure_parent_dir(path)?;
    Ok(File::create(path)?)
}

//! Recursive input discovery.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::logging::log_warning;

/// Every file below `root`, at any depth, named exactly `file_name`.
///
/// Results are sorted so repeated runs see the same order. Any unreadable
/// directory aborts the walk. Symlinked directories are not descended into,
/// but a matching symlink that resolves to a file is returned as is.
pub fn discover_files(root: &Path, file_name: &str) -> DiscoveryResult<Vec<PathBuf>> {
    let meta = fs::metadata(root).map_err(|source| DiscoveryError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if entry.file_name() != file_name {
            continue;
        }
        if entry.file_type().is_file() {
            found.push(entry.into_path());
        } else if entry.path_is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(target) if target.is_file() => found.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => log_warning(format!(
                    "Skipping broken link {}: {}",
                    entry.path().display(),
                    e
                )),
            }
        }
    }
    found.sort();
    Ok(found)
}

//! Output locations derived from input paths.
//!
//! Input files live in a two-level hierarchy (`<region>/<tile>/lake_change.gpkg`).
//! Outputs mirror the last two segments of the input's parent directory under
//! a separate root, so every input maps to a distinct output location:
//!
//! ```text
//! /data/lake_change_GD/32607/0_0/lake_change.gpkg
//!   → <audit-root>/32607/0_0/drop_na_rows.csv
//!   → <clean-root>/32607/0_0/lake_change_cleaned_na.gpkg
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::CleanConfig;
use crate::error::LayoutError;

/// Last two segments of the input file's parent directory, as a relative path.
pub fn relative_parent(input: &Path) -> Result<PathBuf, LayoutError> {
    let parent = input
        .parent()
        .ok_or_else(|| LayoutError::TooShallow(input.to_path_buf()))?;

    let segments: Vec<_> = parent
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s),
            _ => None,
        })
        .collect();

    match segments.as_slice() {
        [.., a, b] => Ok(Path::new(a).join(b)),
        _ => Err(LayoutError::TooShallow(input.to_path_buf())),
    }
}

/// Create every missing directory leading to `path`. Succeeds if they exist.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Output roots and file names for both artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    pub audit_root: PathBuf,
    pub audit_file_name: String,
    pub clean_root: PathBuf,
    pub clean_file_name: String,
}

impl OutputLayout {
    pub fn from_config(config: &CleanConfig) -> Self {
        Self {
            audit_root: config.audit_root.clone(),
            audit_file_name: config.audit_file_name.clone(),
            clean_root: config.clean_root.clone(),
            clean_file_name: config.clean_file_name.clone(),
        }
    }

    /// `<audit-root>/<A>/<B>/<audit-file-name>`
    pub fn audit_path(&self, input: &Path) -> Result<PathBuf, LayoutError> {
        Ok(self
            .audit_root
            .join(relative_parent(input)?)
            .join(&self.audit_file_name))
    }

    /// `<clean-root>/<A>/<B>/<clean-file-name>`
    pub fn clean_path(&self, input: &Path) -> Result<PathBuf, LayoutError> {
        Ok(self
            .clean_root
            .join(relative_parent(input)?)
            .join(&self.clean_file_name))
    }
}

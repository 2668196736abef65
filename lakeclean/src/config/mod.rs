//! Run configuration.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. built-in defaults ([`CleanConfig::default`]), the locations used by the
//!    lake change workflow on the processing host
//! 2. a TOML file (keys that are absent keep their default)
//! 3. `LAKECLEAN_*` environment variables (a `.env` file is honoured by the CLI)
//! 4. command line flags, applied by the binary
//!
//! ```toml
//! input_root = "/data/lake_change_GD"
//! audit_root = "/out/invalid_data_documentation"
//! clean_root = "/out/cleaned_files"
//! limit = 1
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_INPUT_ROOT: &str = "/home/pdg/data/nitze_lake_change/data_2022-11-04/lake_change_GD/";
pub const DEFAULT_TARGET_FILE_NAME: &str = "lake_change.gpkg";
pub const DEFAULT_AUDIT_ROOT: &str =
    "/home/jcohen/lake_change_GD_workflow/workflow_cleaned/invalid_data_documentation/";
pub const DEFAULT_AUDIT_FILE_NAME: &str = "drop_na_rows.csv";
pub const DEFAULT_CLEAN_ROOT: &str = "/home/jcohen/lake_change_GD_workflow/workflow_cleaned/cleaned_files/";
pub const DEFAULT_CLEAN_FILE_NAME: &str = "lake_change_cleaned_na.gpkg";

pub const ENV_INPUT_ROOT: &str = "LAKECLEAN_INPUT_ROOT";
pub const ENV_AUDIT_ROOT: &str = "LAKECLEAN_AUDIT_ROOT";
pub const ENV_CLEAN_ROOT: &str = "LAKECLEAN_CLEAN_ROOT";
pub const ENV_LIMIT: &str = "LAKECLEAN_LIMIT";

/// Where to look for inputs and where to put both artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Directory searched recursively for input files.
    pub input_root: PathBuf,
    /// Exact file name of the inputs.
    pub target_file_name: String,
    /// Root of the CSV audit tree.
    pub audit_root: PathBuf,
    pub audit_file_name: String,
    /// Root of the cleaned GeoPackage tree.
    pub clean_root: PathBuf,
    pub clean_file_name: String,
    /// Process only the first `limit` discovered files (test runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from(DEFAULT_INPUT_ROOT),
            target_file_name: DEFAULT_TARGET_FILE_NAME.to_string(),
            audit_root: PathBuf::from(DEFAULT_AUDIT_ROOT),
            audit_file_name: DEFAULT_AUDIT_FILE_NAME.to_string(),
            clean_root: PathBuf::from(DEFAULT_CLEAN_ROOT),
            clean_file_name: DEFAULT_CLEAN_FILE_NAME.to_string(),
            limit: None,
        }
    }
}

impl CleanConfig {
    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `LAKECLEAN_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_INPUT_ROOT) {
            self.input_root = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_AUDIT_ROOT) {
            self.audit_root = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_CLEAN_ROOT) {
            self.clean_root = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_LIMIT) {
            let limit = v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_LIMIT.to_string(),
                value: v.clone(),
            })?;
            self.limit = Some(limit);
        }
        Ok(self)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

//! Error types for the lakeclean pipeline.
//!
//! One error type per stage, plus a top-level [`PipelineError`]:
//!
//! - [`DiscoveryError`] - walking the input tree
//! - [`LayoutError`] - deriving output locations from an input path
//! - [`GpkgError`] - reading or writing GeoPackage files
//! - [`AuditError`] - writing the CSV audit artifact
//! - [`ConfigError`] - loading configuration
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Lower-level errors convert into [`PipelineError`] through `From`, so `?`
//! works across stage boundaries. The underlying I/O or SQLite error is kept
//! as the source and printed in the message.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Discovery Errors
// =============================================================================

/// Errors while enumerating input files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Root directory does not exist or is not a directory.
    #[error("Input root is not a readable directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Root directory metadata could not be read.
    #[error("Cannot read input root {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry below the root could not be read.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

// =============================================================================
// Layout Errors
// =============================================================================

/// Errors while deriving output paths.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The input file's parent directory has fewer than two path segments.
    #[error("Cannot derive output location from {}: parent directory needs at least two segments", .0.display())]
    TooShallow(PathBuf),
}

// =============================================================================
// GeoPackage Errors
// =============================================================================

/// Errors while reading or writing GeoPackage files.
#[derive(Debug, Error)]
pub enum GpkgError {
    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// File system error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No `features` layer registered in `gpkg_contents`.
    #[error("No feature layer found in {}", .0.display())]
    NoFeatureLayer(PathBuf),

    /// Layer has no entry in `gpkg_geometry_columns`.
    #[error("Layer '{0}' has no registered geometry column")]
    NoGeometryColumn(String),

    /// Geometry blob does not carry a valid GeoPackage binary header.
    #[error("Malformed geometry in row {row}: {message}")]
    MalformedGeometry { row: usize, message: String },

    /// TEXT cell whose bytes are not UTF-8.
    #[error("Invalid UTF-8 text in row {row}, column '{column}'")]
    InvalidText { row: usize, column: String },

    /// Output path points at the dataset's own source file.
    #[error("Refusing to overwrite source file {}", .0.display())]
    WouldOverwriteSource(PathBuf),
}

// =============================================================================
// Audit Errors
// =============================================================================

/// Errors while writing the CSV audit artifact.
#[derive(Debug, Error)]
pub enum AuditError {
    /// File system error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::config::CleanConfig`].
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered as TOML.
    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// An environment override holds an unusable value.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::pipeline::run`]. Every variant
/// is fatal: the run stops at the first failing file.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input discovery failed.
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Output path derivation failed.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// GeoPackage read or write failed.
    #[error("GeoPackage error in {}: {source}", path.display())]
    Gpkg {
        path: PathBuf,
        #[source]
        source: GpkgError,
    },

    /// Audit artifact could not be written.
    #[error("Audit error for {}: {source}", path.display())]
    Audit {
        path: PathBuf,
        #[source]
        source: AuditError,
    },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub(crate) fn gpkg(path: impl Into<PathBuf>, source: GpkgError) -> Self {
        Self::Gpkg {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn audit(path: impl Into<PathBuf>, source: AuditError) -> Self {
        Self::Audit {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for discovery.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Result type for GeoPackage operations.
pub type GpkgResult<T> = Result<T, GpkgError>;

/// Result type for audit writing.
pub type AuditResult<T> = Result<T, AuditError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

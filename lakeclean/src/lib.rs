//! # lakeclean - drop and document rows with missing values in lake change GeoPackages
//!
//! Lake change polygons are delivered as one `lake_change.gpkg` per tile in a
//! two-level directory hierarchy. lakeclean finds every such file, records the
//! rows that have a missing value in any column (geometry included) in a CSV
//! audit file, and writes a cleaned GeoPackage without those rows. Inputs are
//! never modified.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌────────────┐     ┌───────────────────┐
//! │  Discover  │────▶│ GPKG load  │────▶│  Classify  │──┬─▶│ audit CSV         │
//! │ (walkdir)  │     │ (rusqlite) │     │ (null mask)│  │  └───────────────────┘
//! └────────────┘     └────────────┘     └────────────┘  │  ┌───────────────────┐
//!                                                       └─▶│ cleaned GeoPackage│
//!                                                          └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lakeclean::{run, CleanConfig};
//!
//! let config = CleanConfig::load(None)?;
//! let summary = run(&config)?;
//! println!("Dropped {} rows", summary.dropped_rows());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`config`] - Layered run configuration
//! - [`models`] - Dataset, schema and value types
//! - [`geometry`] - GeoPackage geometry blobs and WKT rendering
//! - [`discover`] - Recursive input discovery
//! - [`gpkg`] - GeoPackage reader and writer
//! - [`classify`] - Missing-value classification
//! - [`audit`] - CSV audit artifact
//! - [`layout`] - Output path derivation
//! - [`pipeline`] - End-to-end run
//! - [`logging`] - Progress logging

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Input
pub mod discover;
pub mod geometry;
pub mod gpkg;

// Cleaning
pub mod classify;

// Output
pub mod audit;
pub mod layout;

// Orchestration
pub mod logging;
pub mod pipeline;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    AuditError, ConfigError, DiscoveryError, GpkgError, LayoutError, PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models & Config
// =============================================================================

pub use config::CleanConfig;
pub use models::{Column, Dataset, GeometryColumn, Schema, Value};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use audit::write_audit;
pub use classify::{classify, missing_mask, Classification};
pub use discover::discover_files;
pub use gpkg::{read_dataset, write_dataset};
pub use layout::OutputLayout;

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{inspect_file, process_file, run, FileReport, InspectReport, RunSummary};

//! End-to-end cleaning run.
//!
//! ```text
//! discover ─▶ for each file: load ─▶ classify ─▶ audit CSV ─▶ cleaned GPKG
//! ```
//!
//! Files are handled one at a time and the first error stops the run. Files
//! processed before the failure keep their outputs.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::audit::write_audit;
use crate::classify::{classify, Classification, ColumnMissing};
use crate::config::CleanConfig;
use crate::discover::discover_files;
use crate::error::{PipelineError, PipelineResult};
use crate::gpkg::{read_dataset, write_dataset};
use crate::layout::{ensure_parent, OutputLayout};
use crate::logging::{log_error, log_info, log_success, log_warning};
use crate::models::Dataset;

/// Outcome for one input file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub total_rows: usize,
    pub complete_rows: usize,
    pub incomplete_rows: usize,
    pub missing_by_column: Vec<ColumnMissing>,
    pub audit_path: PathBuf,
    pub clean_path: PathBuf,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Files matching the target name under the input root.
    pub discovered: usize,
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    pub fn total_rows(&self) -> usize {
        self.reports.iter().map(|r| r.total_rows).sum()
    }

    pub fn dropped_rows(&self) -> usize {
        self.reports.iter().map(|r| r.incomplete_rows).sum()
    }
}

/// Summary of one file without writing anything.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub layer: String,
    pub geometry_column: String,
    pub geometry_type: String,
    pub srs_id: i32,
    pub columns: Vec<String>,
    pub total_rows: usize,
    pub complete_rows: usize,
    pub incomplete_rows: usize,
    pub missing_by_column: Vec<ColumnMissing>,
}

/// Discover inputs under the configured root and clean each one.
pub fn run(config: &CleanConfig) -> PipelineResult<RunSummary> {
    let layout = OutputLayout::from_config(config);

    let mut inputs = discover_files(&config.input_root, &config.target_file_name)?;
    let discovered = inputs.len();
    log_info(format!(
        "Collected {} {} filepaths.",
        discovered, config.target_file_name
    ));

    if let Some(limit) = config.limit {
        if limit < inputs.len() {
            inputs.truncate(limit);
            log_warning(format!("Processing the first {} of {} files", limit, discovered));
        }
    }

    let mut summary = RunSummary {
        discovered,
        reports: Vec::with_capacity(inputs.len()),
    };
    for input in &inputs {
        match process_file(input, &layout) {
            Ok(report) => summary.reports.push(report),
            Err(e) => {
                log_error(format!("Stopping at {}: {}", input.display(), e));
                return Err(e);
            }
        }
    }

    log_success(format!(
        "Cleaning complete: {} files, {} rows dropped of {}.",
        summary.processed(),
        summary.dropped_rows(),
        summary.total_rows()
    ));
    Ok(summary)
}

/// Load, classify and write both artifacts for a single input.
pub fn process_file(input: &Path, layout: &OutputLayout) -> PipelineResult<FileReport> {
    let audit_path = layout.audit_path(input)?;
    let clean_path = layout.clean_path(input)?;

    log_info(format!("Checking file {}.", input.display()));
    let dataset = read_dataset(input).map_err(|e| PipelineError::gpkg(input, e))?;
    let classification = classify(&dataset);
    for column in classification.columns_with_missing() {
        log_info(format!(
            "{}: {} missing value(s)",
            column.column, column.missing
        ));
    }

    write_audit(&audit_path, &dataset.schema, &classification.incomplete)
        .map_err(|e| PipelineError::audit(&audit_path, e))?;
    log_success(format!(
        "Saved {} row(s) with missing values to {}",
        classification.incomplete.len(),
        audit_path.display()
    ));

    write_cleaned(&dataset, &classification, &clean_path)?;
    log_success(format!(
        "Saved {} complete row(s) to {}",
        classification.complete.len(),
        clean_path.display()
    ));

    Ok(FileReport {
        input: input.to_path_buf(),
        total_rows: dataset.len(),
        complete_rows: classification.complete.len(),
        incomplete_rows: classification.incomplete.len(),
        missing_by_column: classification.missing_by_column,
        audit_path,
        clean_path,
    })
}

fn write_cleaned(
    dataset: &Dataset,
    classification: &Classification,
    clean_path: &Path,
) -> PipelineResult<()> {
    let cleaned = dataset.with_rows(classification.complete.clone());
    ensure_parent(clean_path).map_err(|e| PipelineError::gpkg(clean_path, e.into()))?;
    write_dataset(&cleaned, clean_path).map_err(|e| PipelineError::gpkg(clean_path, e))
}

/// Load and classify one file, reporting counts only.
pub fn inspect_file(path: &Path) -> PipelineResult<InspectReport> {
    let dataset = read_dataset(path).map_err(|e| PipelineError::gpkg(path, e))?;
    let classification = classify(&dataset);

    Ok(InspectReport {
        path: path.to_path_buf(),
        layer: dataset.layer.table_name.clone(),
        geometry_column: dataset.schema.geometry.name.clone(),
        geometry_type: dataset.schema.geometry.geometry_type.clone(),
        srs_id: dataset.schema.geometry.srs_id,
        columns: dataset.schema.names().into_iter().map(String::from).collect(),
        total_rows: dataset.len(),
        complete_rows: classification.complete.len(),
        incomplete_rows: classification.incomplete.len(),
        missing_by_column: classification.missing_by_column,
    })
}

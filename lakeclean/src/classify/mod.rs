//! Missing-value classification.
//!
//! A row is *incomplete* when any of its values, the geometry included, is
//! [`Value::Missing`]. Detection runs column by column into a boolean mask,
//! then a single pass partitions the rows by that mask.

use serde::Serialize;

use crate::models::{Dataset, Value};

/// Rows split by completeness, in input order.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub complete: Vec<Vec<Value>>,
    pub incomplete: Vec<Vec<Value>>,
    /// Missing-value count per column, geometry last.
    pub missing_by_column: Vec<ColumnMissing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

impl Classification {
    pub fn total(&self) -> usize {
        self.complete.len() + self.incomplete.len()
    }

    /// Columns that contain at least one missing value.
    pub fn columns_with_missing(&self) -> impl Iterator<Item = &ColumnMissing> {
        self.missing_by_column.iter().filter(|c| c.missing > 0)
    }
}

/// `true` at index `i` when row `i` has a missing value in any column.
pub fn missing_mask(dataset: &Dataset) -> Vec<bool> {
    let (mask, _) = mask_with_counts(dataset);
    mask
}

fn mask_with_counts(dataset: &Dataset) -> (Vec<bool>, Vec<usize>) {
    let width = dataset.schema.width();
    let mut mask = vec![false; dataset.rows.len()];
    let mut counts = vec![0usize; width];

    for (col, count) in counts.iter_mut().enumerate() {
        for (flag, row) in mask.iter_mut().zip(&dataset.rows) {
            // Short rows count as missing in the absent columns.
            let null = row.get(col).map_or(true, Value::is_missing);
            *count += null as usize;
            *flag |= null;
        }
    }
    (mask, counts)
}

/// Partition `dataset` into complete and incomplete rows.
pub fn classify(dataset: &Dataset) -> Classification {
    let (mask, counts) = mask_with_counts(dataset);

    let (incomplete, complete): (Vec<_>, Vec<_>) = dataset
        .rows
        .iter()
        .zip(&mask)
        .partition(|(_, missing)| **missing);

    let missing_by_column = dataset
        .schema
        .names()
        .into_iter()
        .zip(counts)
        .map(|(name, missing)| ColumnMissing {
            column: name.to_string(),
            missing,
        })
        .collect();

    Classification {
        complete: complete.into_iter().map(|(row, _)| row.clone()).collect(),
        incomplete: incomplete.into_iter().map(|(row, _)| row.clone()).collect(),
        missing_by_column,
    }
}

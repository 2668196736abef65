//! Domain models for the lakeclean pipeline.
//!
//! - [`Value`] - a single cell: text, number, blob, geometry or missing
//! - [`Column`] / [`GeometryColumn`] / [`Schema`] - layer structure
//! - [`LayerInfo`] / [`SpatialRefSys`] - GeoPackage metadata carried to the output
//! - [`Dataset`] - one loaded layer, rows held in memory

use serde::Serialize;
use std::path::PathBuf;

use crate::geometry::GeometryBlob;

// =============================================================================
// Cell Values
// =============================================================================

/// A single cell of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Real(f64),
    Blob(Vec<u8>),
    Geometry(GeometryBlob),
    /// SQL `NULL`, including a null geometry.
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

// =============================================================================
// Schema
// =============================================================================

/// An attribute column with its declared SQL type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    /// Declared type as written in the table definition (may be empty).
    pub decl_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, decl_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl_type: decl_type.into(),
        }
    }
}

/// The geometry column of a feature layer, as registered in
/// `gpkg_geometry_columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryColumn {
    pub name: String,
    /// Geometry type name, e.g. `POLYGON` or `MULTIPOLYGON`.
    pub geometry_type: String,
    pub srs_id: i32,
    /// 0 = prohibited, 1 = mandatory, 2 = optional.
    pub z: i32,
    pub m: i32,
}

/// Ordered attribute columns plus the geometry column.
///
/// Row values follow this order: every attribute, then the geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub columns: Vec<Column>,
    pub geometry: GeometryColumn,
    /// Integer primary key of the source table, when it declares one.
    pub primary_key: Option<String>,
}

impl Schema {
    /// Number of values per row.
    pub fn width(&self) -> usize {
        self.columns.len() + 1
    }

    /// Column names in row order, geometry last.
    pub fn names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .chain(std::iter::once(self.geometry.name.as_str()))
            .collect()
    }

    /// Primary key column for a written copy of this layer.
    ///
    /// The source key name is kept. Without one, `fid` is used, suffixed
    /// until it matches no other column (SQLite names are case-insensitive).
    pub fn output_primary_key(&self) -> String {
        if let Some(ref pk) = self.primary_key {
            return pk.clone();
        }
        let taken = |name: &str| self.names().iter().any(|n| n.eq_ignore_ascii_case(name));
        let mut candidate = "fid".to_string();
        let mut suffix = 1;
        while taken(&candidate) {
            candidate = format!("fid_{}", suffix);
            suffix += 1;
        }
        candidate
    }
}

// =============================================================================
// GeoPackage Metadata
// =============================================================================

/// A row of `gpkg_spatial_ref_sys`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialRefSys {
    pub srs_name: String,
    pub srs_id: i32,
    pub organization: String,
    pub organization_coordsys_id: i32,
    pub definition: String,
    pub description: Option<String>,
}

/// Layer metadata from `gpkg_contents`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub table_name: String,
    pub identifier: Option<String>,
    pub description: Option<String>,
    pub last_change: String,
    /// `srs_id` recorded in `gpkg_contents`.
    pub srs_id: Option<i32>,
    /// Every row of `gpkg_spatial_ref_sys`.
    pub srs: Vec<SpatialRefSys>,
}

// =============================================================================
// Dataset
// =============================================================================

/// One feature layer loaded wholesale into memory.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// File the dataset was loaded from.
    pub source: PathBuf,
    pub layer: LayerInfo,
    pub schema: Schema,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a dataset with the same source, layer and schema but new rows.
    pub fn with_rows(&self, rows: Vec<Vec<Value>>) -> Dataset {
        Dataset {
            source: self.source.clone(),
            layer: self.layer.clone(),
            schema: self.schema.clone(),
            rows,
        }
    }
}

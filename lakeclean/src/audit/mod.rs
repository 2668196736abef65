//! CSV audit artifact for dropped rows.
//!
//! One file per input, header = every column (attributes in table order,
//! geometry last), one record per row that was dropped. The header is written
//! even when nothing was dropped, so every processed input has an artifact
//! with the same shape.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AuditResult;
use crate::layout::ensure_parent;
use crate::models::{Schema, Value};

/// Render a cell for the audit CSV. Missing values become empty cells.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Missing => String::new(),
        Value::Text(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format_real(*f),
        Value::Blob(b) => hex::encode(b),
        Value::Geometry(g) => g.to_wkt(),
    }
}

/// Shortest round-trip form, keeping a decimal point on integral values.
fn format_real(f: f64) -> String {
    if f.is_finite() {
        format!("{:?}", f)
    } else {
        // Not expected from SQLite storage; kept readable if it ever shows up.
        f.to_string()
    }
}

/// Write `rows` as CSV to any writer.
pub fn write_rows<W: Write>(writer: W, schema: &Schema, rows: &[Vec<Value>]) -> AuditResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(schema.names())?;
    for row in rows {
        csv.write_record(row.iter().map(format_value))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the audit artifact to `path`, creating parent directories.
pub fn write_audit(path: &Path, schema: &Schema, rows: &[Vec<Value>]) -> AuditResult<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    write_rows(file, schema, rows)
}

//! Write a [`Dataset`] as a single-layer GeoPackage.

use rusqlite::{params, params_from_iter, Connection};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::{quote_ident, required_srs, CORE_DDL, GPKG_APPLICATION_ID, GPKG_USER_VERSION};
use crate::error::{GpkgError, GpkgResult};
use crate::geometry::Envelope;
use crate::models::{Dataset, Value};

/// Write `dataset` to `path`, replacing any file already there.
///
/// The layer keeps its table name, column names, declared types, geometry
/// registration and spatial reference definitions. Rows get fresh primary
/// key values in order, under the source key name when there is one. Writing the same dataset twice produces identical bytes.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> GpkgResult<()> {
    if path.exists() {
        if is_same_file(path, &dataset.source) {
            return Err(GpkgError::WouldOverwriteSource(path.to_path_buf()));
        }
        fs::remove_file(path)?;
    }

    let mut conn = Connection::open(path)?;
    conn.execute_batch(&format!(
        "PRAGMA application_id = {}; PRAGMA user_version = {};",
        GPKG_APPLICATION_ID, GPKG_USER_VERSION
    ))?;

    let tx = conn.transaction()?;
    tx.execute_batch(CORE_DDL)?;
    write_srs(&tx, dataset)?;
    create_feature_table(&tx, dataset)?;
    write_contents(&tx, dataset)?;
    write_rows(&tx, dataset)?;
    tx.commit()?;

    debug!(path = %path.display(), rows = dataset.len(), "GeoPackage written");
    Ok(())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn write_srs(conn: &Connection, dataset: &Dataset) -> GpkgResult<()> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO gpkg_spatial_ref_sys \
         (srs_name, srs_id, organization, organization_coordsys_id, definition, description) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for srs in dataset.layer.srs.iter().cloned().chain(required_srs()) {
        stmt.execute(params![
            srs.srs_name,
            srs.srs_id,
            srs.organization,
            srs.organization_coordsys_id,
            srs.definition,
            srs.description
        ])?;
    }
    Ok(())
}

fn create_feature_table(conn: &Connection, dataset: &Dataset) -> GpkgResult<()> {
    let schema = &dataset.schema;
    let mut defs = vec![
        format!(
            "{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL",
            quote_ident(&schema.output_primary_key())
        ),
        format!(
            "{} {}",
            quote_ident(&schema.geometry.name),
            schema.geometry.geometry_type
        ),
    ];
    for column in &schema.columns {
        if column.decl_type.is_empty() {
            defs.push(quote_ident(&column.name));
        } else {
            defs.push(format!("{} {}", quote_ident(&column.name), column.decl_type));
        }
    }
    let sql = format!(
        "CREATE TABLE {} ({})",
        quote_ident(&dataset.layer.table_name),
        defs.join(", ")
    );
    conn.execute(&sql, [])?;
    Ok(())
}

/// Extent of every geometry that carries a header envelope.
fn extent(dataset: &Dataset) -> Option<Envelope> {
    let geometry_index = dataset.schema.columns.len();
    dataset
        .rows
        .iter()
        .filter_map(|row| match row.get(geometry_index) {
            Some(Value::Geometry(g)) if !g.is_empty() => g.envelope(),
            _ => None,
        })
        .reduce(Envelope::union)
}

fn write_contents(conn: &Connection, dataset: &Dataset) -> GpkgResult<()> {
    let layer = &dataset.layer;
    let geometry = &dataset.schema.geometry;
    let bounds = extent(dataset);

    conn.execute(
        "INSERT INTO gpkg_contents \
         (table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id) \
         VALUES (?1, 'features', ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            layer.table_name,
            layer.identifier,
            layer.description,
            layer.last_change,
            bounds.map(|b| b.min_x),
            bounds.map(|b| b.min_y),
            bounds.map(|b| b.max_x),
            bounds.map(|b| b.max_y),
            layer.srs_id.unwrap_or(geometry.srs_id),
        ],
    )?;
    conn.execute(
        "INSERT INTO gpkg_geometry_columns \
         (table_name, column_name, geometry_type_name, srs_id, z, m) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            layer.table_name,
            geometry.name,
            geometry.geometry_type,
            geometry.srs_id,
            geometry.z,
            geometry.m
        ],
    )?;
    Ok(())
}

fn write_rows(conn: &Connection, dataset: &Dataset) -> GpkgResult<()> {
    let names: Vec<String> = dataset
        .schema
        .names()
        .into_iter()
        .map(quote_ident)
        .collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&dataset.layer.table_name),
        names.join(", "),
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    for row in &dataset.rows {
        stmt.execute(params_from_iter(row.iter()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpkg::fixtures::{move_key_to_ogc_fid, write_lake_change, LakeRow};
    use crate::gpkg::read_dataset;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read_preserves_layer() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in/lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(1), LakeRow::complete(2)]);
        let ds = read_dataset(&input).unwrap();

        let output = dir.path().join("out.gpkg");
        write_dataset(&ds, &output).unwrap();
        let back = read_dataset(&output).unwrap();

        assert_eq!(back.layer.table_name, ds.layer.table_name);
        assert_eq!(back.layer.last_change, ds.layer.last_change);
        assert_eq!(back.schema, ds.schema);
        assert_eq!(back.rows, ds.rows);
    }

    #[test]
    fn test_application_id_and_version() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in/lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(1)]);
        let output = dir.path().join("out.gpkg");
        write_dataset(&read_dataset(&input).unwrap(), &output).unwrap();

        let conn = Connection::open(&output).unwrap();
        let app_id: i32 = conn.query_row("PRAGMA application_id", [], |r| r.get(0)).unwrap();
        let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
        assert_eq!(app_id, GPKG_APPLICATION_ID);
        assert_eq!(version, GPKG_USER_VERSION);
    }

    #[test]
    fn test_empty_layer_is_valid() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in/lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(1)]);
        let ds = read_dataset(&input).unwrap().with_rows(Vec::new());

        let output = dir.path().join("empty.gpkg");
        write_dataset(&ds, &output).unwrap();
        let back = read_dataset(&output).unwrap();
        assert!(back.is_empty());
        assert_eq!(back.schema, ds.schema);

        let conn = Connection::open(&output).unwrap();
        let min_x: Option<f64> = conn
            .query_row("SELECT min_x FROM gpkg_contents", [], |r| r.get(0))
            .unwrap();
        assert!(min_x.is_none());
    }

    #[test]
    fn test_bounds_follow_written_rows() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in/lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(2), LakeRow::complete(5)]);
        let output = dir.path().join("out.gpkg");
        write_dataset(&read_dataset(&input).unwrap(), &output).unwrap();

        let conn = Connection::open(&output).unwrap();
        let bounds: (f64, f64, f64, f64) = conn
            .query_row("SELECT min_x, min_y, max_x, max_y FROM gpkg_contents", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
            })
            .unwrap();
        assert_eq!(bounds, (2.0, 2.0, 6.0, 6.0));
    }

    #[test]
    fn test_output_is_deterministic() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in/lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(1), LakeRow::complete(2)]);
        let ds = read_dataset(&input).unwrap();

        let output = dir.path().join("out.gpkg");
        write_dataset(&ds, &output).unwrap();
        let first = fs::read(&output).unwrap();
        write_dataset(&ds, &output).unwrap();
        let second = fs::read(&output).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_refuses_to_overwrite_source() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(1)]);
        let ds = read_dataset(&input).unwrap();

        let err = write_dataset(&ds, &input).unwrap_err();
        assert!(matches!(err, GpkgError::WouldOverwriteSource(_)));
        assert_eq!(read_dataset(&input).unwrap().len(), 1);
    }

    #[test]
    fn test_fid_attribute_next_to_other_key() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in/lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(1), LakeRow::complete(2)]);
        move_key_to_ogc_fid(&input);
        let ds = read_dataset(&input).unwrap();
        assert_eq!(ds.schema.primary_key.as_deref(), Some("ogc_fid"));
        assert_eq!(
            ds.schema.names(),
            vec!["id_lake", "area_ha", "n_obs", "fid", "geom"]
        );

        let output = dir.path().join("out.gpkg");
        write_dataset(&ds, &output).unwrap();
        let back = read_dataset(&output).unwrap();
        assert_eq!(back.schema, ds.schema);
        assert_eq!(back.rows, ds.rows);
        assert_eq!(back.rows[1][3], Value::Text("tile_2".into()));
    }

    #[test]
    fn test_keyless_table_gets_free_key_name() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in/lake_change.gpkg");
        write_lake_change(&input, &[LakeRow::complete(1)]);
        move_key_to_ogc_fid(&input);
        let mut ds = read_dataset(&input).unwrap();
        ds.schema.primary_key = None;

        let output = dir.path().join("out.gpkg");
        write_dataset(&ds, &output).unwrap();
        let back = read_dataset(&output).unwrap();
        assert_eq!(back.schema.primary_key.as_deref(), Some("fid_1"));
        assert_eq!(back.rows, ds.rows);
    }
}

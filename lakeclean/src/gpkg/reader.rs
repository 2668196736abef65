//! Load a feature layer into a [`Dataset`].

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use super::quote_ident;
use crate::error::{GpkgError, GpkgResult};
use crate::geometry::GeometryBlob;
use crate::models::{Column, Dataset, GeometryColumn, LayerInfo, Schema, SpatialRefSys, Value};

/// Read the first feature layer of a GeoPackage.
///
/// Layers are taken in `table_name` order from `gpkg_contents`. The integer
/// primary key identifies rows and is not returned as an attribute; rows come
/// back in primary key order. SQL `NULL` becomes [`Value::Missing`]. TEXT
/// cells that are not valid UTF-8 are an error rather than being rewritten.
pub fn read_dataset(path: &Path) -> GpkgResult<Dataset> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;

    let mut layer = read_layer(&conn)?
        .ok_or_else(|| GpkgError::NoFeatureLayer(path.to_path_buf()))?;
    let geometry = read_geometry_column(&conn, &layer.table_name)?
        .ok_or_else(|| GpkgError::NoGeometryColumn(layer.table_name.clone()))?;
    layer.srs = read_srs(&conn)?;

    let (columns, pk) = read_columns(&conn, &layer.table_name, &geometry.name)?;
    debug!(
        table = %layer.table_name,
        columns = columns.len(),
        geometry = %geometry.name,
        srs_id = ?layer.srs_id,
        "Reading feature layer"
    );

    let schema = Schema {
        columns,
        geometry,
        primary_key: pk,
    };
    let rows = read_rows(&conn, &layer.table_name, &schema)?;

    Ok(Dataset {
        source: path.to_path_buf(),
        layer,
        schema,
        rows,
    })
}

fn read_layer(conn: &Connection) -> GpkgResult<Option<LayerInfo>> {
    let layer = conn
        .query_row(
            "SELECT table_name, identifier, description, last_change, srs_id \
             FROM gpkg_contents WHERE data_type = 'features' \
             ORDER BY table_name LIMIT 1",
            [],
            |row| {
                Ok(LayerInfo {
                    table_name: row.get(0)?,
                    identifier: row.get(1)?,
                    description: row.get(2)?,
                    last_change: row.get(3)?,
                    srs_id: row.get(4)?,
                    srs: Vec::new(),
                })
            },
        )
        .optional()?;
    Ok(layer)
}

fn read_geometry_column(conn: &Connection, table: &str) -> GpkgResult<Option<GeometryColumn>> {
    let geometry = conn
        .query_row(
            "SELECT column_name, geometry_type_name, srs_id, z, m \
             FROM gpkg_geometry_columns WHERE table_name = ?1",
            params![table],
            |row| {
                Ok(GeometryColumn {
                    name: row.get(0)?,
                    geometry_type: row.get(1)?,
                    srs_id: row.get(2)?,
                    z: row.get(3)?,
                    m: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(geometry)
}

fn read_srs(conn: &Connection) -> GpkgResult<Vec<SpatialRefSys>> {
    let mut stmt = conn.prepare(
        "SELECT srs_name, srs_id, organization, organization_coordsys_id, definition, description \
         FROM gpkg_spatial_ref_sys ORDER BY srs_id",
    )?;
    let srs = stmt
        .query_map([], |row| {
            Ok(SpatialRefSys {
                srs_name: row.get(0)?,
                srs_id: row.get(1)?,
                organization: row.get(2)?,
                organization_coordsys_id: row.get(3)?,
                definition: row.get(4)?,
                description: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(srs)
}

/// Attribute columns in table order, and the integer primary key if any.
fn read_columns(
    conn: &Connection,
    table: &str,
    geometry: &str,
) -> GpkgResult<(Vec<Column>, Option<String>)> {
    let mut stmt =
        conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
    let mut rows = stmt.query(params![table])?;

    let mut columns = Vec::new();
    let mut pk = None;
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let decl_type: String = row.get::<_, Option<String>>(1)?.unwrap_or_default();
        let pk_index: i64 = row.get(2)?;

        if pk_index > 0 && decl_type.eq_ignore_ascii_case("INTEGER") {
            pk = Some(name);
        } else if !name.eq_ignore_ascii_case(geometry) {
            columns.push(Column::new(name, decl_type));
        }
    }
    Ok((columns, pk))
}

fn read_rows(
    conn: &Connection,
    table: &str,
    schema: &Schema,
) -> GpkgResult<Vec<Vec<Value>>> {
    let select: Vec<String> = schema.names().into_iter().map(quote_ident).collect();
    let order = schema
        .primary_key
        .as_deref()
        .map(quote_ident).unwrap_or_else(|| "rowid".to_string());
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select.join(", "),
        quote_ident(table),
        order
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut cursor = stmt.query([])?;
    let geometry_index = schema.columns.len();

    let mut rows = Vec::new();
    while let Some(row) = cursor.next()? {
        let index = rows.len();
        let values = schema
            .names()
            .into_iter()
            .enumerate()
            .map(|(i, name)| read_value(row, i, name, i == geometry_index, index))
            .collect::<GpkgResult<Vec<_>>>()?;
        rows.push(values);
    }
    Ok(rows)
}

fn read_value(
    row: &Row<'_>,
    i: usize,
    column: &str,
    is_geometry: bool,
    index: usize,
) -> GpkgResult<Value> {
    let value = match row.get_ref(i)? {
        ValueRef::Null => Value::Missing,
        ValueRef::Blob(b) if is_geometry => Value::Geometry(
            GeometryBlob::from_bytes(b.to_vec())
                .map_err(|message| GpkgError::MalformedGeometry { row: index, message })?,
        ),
        _ if is_geometry => {
            return Err(GpkgError::MalformedGeometry {
                row: index,
                message: "geometry value is not a blob".to_string(),
            })
        }
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => {
                return Err(GpkgError::InvalidText {
                    row: index,
                    column: column.to_string(),
                })
            }
        },
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpkg::fixtures::{write_lake_change, LakeRow};
    use tempfile::tempdir;

    #[test]
    fn test_reads_schema_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lake_change.gpkg");
        write_lake_change(
            &path,
            &[
                LakeRow::complete(1),
                LakeRow { area_ha: None, ..LakeRow::complete(2) },
                LakeRow { geom: None, ..LakeRow::complete(3) },
            ],
        );

        let ds = read_dataset(&path).unwrap();
        assert_eq!(ds.layer.table_name, "lake_change");
        assert_eq!(ds.schema.names(), vec!["id_lake", "area_ha", "n_obs", "geom"]);
        assert_eq!(ds.schema.geometry.geometry_type, "POLYGON");
        assert_eq!(ds.len(), 3);

        assert_eq!(ds.rows[0][0], Value::Text("lake_1".into()));
        assert_eq!(ds.rows[0][1], Value::Real(1.5));
        assert_eq!(ds.rows[0][2], Value::Integer(1));
        assert!(matches!(ds.rows[0][3], Value::Geometry(_)));
        assert_eq!(ds.rows[1][1], Value::Missing);
        assert_eq!(ds.rows[2][3], Value::Missing);
        assert!(ds.layer.srs.iter().any(|s| s.srs_id == 4326));
    }

    #[test]
    fn test_invalid_utf8_text_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lake_change.gpkg");
        write_lake_change(&path, &[LakeRow::complete(1), LakeRow::complete(2)]);
        let conn = Connection::open(&path).unwrap();
        conn.execute(
            "UPDATE lake_change SET id_lake = CAST(X'6C616B65FF' AS TEXT) WHERE fid = 2",
            [],
        )
        .unwrap();
        drop(conn);

        match read_dataset(&path) {
            Err(GpkgError::InvalidText { row, column }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "id_lake");
            }
            other => panic!("expected InvalidText, got {:?}", other),
        }
    }

    #[test]
    fn test_not_a_geopackage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lake_change.gpkg");
        std::fs::write(&path, b"definitely not sqlite, just some text padding it out").unwrap();
        assert!(matches!(read_dataset(&path), Err(GpkgError::Sqlite(_))));
    }

    #[test]
    fn test_no_feature_layer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lake_change.gpkg");
        write_lake_change(&path, &[]);
        let conn = Connection::open(&path).unwrap();
        conn.execute("UPDATE gpkg_contents SET data_type = 'attributes'", [])
            .unwrap();
        drop(conn);
        assert!(matches!(read_dataset(&path), Err(GpkgError::NoFeatureLayer(_))));
    }

    #[test]
    fn test_malformed_geometry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lake_change.gpkg");
        write_lake_change(&path, &[LakeRow::complete(1), LakeRow::complete(2)]);
        let conn = Connection::open(&path).unwrap();
        conn.execute("UPDATE lake_change SET geom = X'00010203' WHERE fid = 2", [])
            .unwrap();
        drop(conn);
        let err = read_dataset(&path).unwrap_err();
        assert!(matches!(err, GpkgError::MalformedGeometry { row: 1, .. }));
    }
}

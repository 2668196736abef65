//! GeoPackage (OGC 12-128r) access through SQLite.
//!
//! Only the parts needed to carry one vector feature layer from an input file
//! to a cleaned copy are handled: the spatial reference table, the contents
//! table, the geometry column registry and the feature table itself.

mod reader;
mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use reader::read_dataset;
pub use writer::write_dataset;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;

use crate::models::{SpatialRefSys, Value};

/// `PRAGMA application_id` for GeoPackage files ("GPKG").
pub const GPKG_APPLICATION_ID: i32 = 0x4750_4B47;

/// `PRAGMA user_version` for GeoPackage 1.2.
pub const GPKG_USER_VERSION: i32 = 10200;

/// Core metadata tables, as defined by the GeoPackage standard.
const CORE_DDL: &str = r#"
CREATE TABLE gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);
CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
CREATE TABLE gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
    CONSTRAINT uk_gc_table_name UNIQUE (table_name),
    CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys (srs_id)
);
"#;

/// Spatial reference systems every GeoPackage must define.
fn required_srs() -> Vec<SpatialRefSys> {
    vec![
        SpatialRefSys {
            srs_name: "Undefined cartesian SRS".into(),
            srs_id: -1,
            organization: "NONE".into(),
            organization_coordsys_id: -1,
            definition: "undefined".into(),
            description: Some("undefined cartesian coordinate reference system".into()),
        },
        SpatialRefSys {
            srs_name: "Undefined geographic SRS".into(),
            srs_id: 0,
            organization: "NONE".into(),
            organization_coordsys_id: 0,
            definition: "undefined".into(),
            description: Some("undefined geographic coordinate reference system".into()),
        },
        SpatialRefSys {
            srs_name: "WGS 84 geodetic".into(),
            srs_id: 4326,
            organization: "EPSG".into(),
            organization_coordsys_id: 4326,
            definition: r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#.into(),
            description: Some("longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid".into()),
        },
    ]
}

/// Quote an SQL identifier.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Geometry(g) => ToSqlOutput::Borrowed(ValueRef::Blob(g.as_bytes())),
            Value::Missing => ToSqlOutput::Borrowed(ValueRef::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("area_ha"), "\"area_ha\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_required_srs_ids() {
        let ids: Vec<_> = required_srs().iter().map(|s| s.srs_id).collect();
        assert_eq!(ids, vec![-1, 0, 4326]);
    }
}

//! Test GeoPackages shaped like the lake change inputs.

use rusqlite::{params, Connection};
use std::path::Path;

use crate::geometry::test_blobs::square;

/// One input feature. `None` is stored as SQL `NULL`.
#[derive(Debug, Clone)]
pub struct LakeRow {
    pub id_lake: Option<String>,
    pub area_ha: Option<f64>,
    pub n_obs: Option<i64>,
    pub geom: Option<Vec<u8>>,
}

impl LakeRow {
    pub fn complete(i: i64) -> Self {
        Self {
            id_lake: Some(format!("lake_{}", i)),
            area_ha: Some(i as f64 + 0.5),
            n_obs: Some(i),
            geom: Some(square(i as f64, i as f64)),
        }
    }
}

/// Write a single-layer GeoPackage the way GDAL lays one out.
pub fn write_lake_change(path: &Path, rows: &[LakeRow]) {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).unwrap();
    }
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(&format!(
        "PRAGMA application_id = {}; PRAGMA user_version = {};",
        super::GPKG_APPLICATION_ID,
        super::GPKG_USER_VERSION
    ))
    .unwrap();
    conn.execute_batch(super::CORE_DDL).unwrap();
    for srs in super::required_srs() {
        conn.execute(
            "INSERT INTO gpkg_spatial_ref_sys VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                srs.srs_name,
                srs.srs_id,
                srs.organization,
                srs.organization_coordsys_id,
                srs.definition,
                srs.description
            ],
        )
        .unwrap();
    }
    conn.execute_batch(
        r#"
        CREATE TABLE "lake_change" (
            "fid" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            "geom" POLYGON,
            "id_lake" TEXT,
            "area_ha" REAL,
            "n_obs" INTEGER
        );
        INSERT INTO gpkg_contents
            (table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id)
            VALUES ('lake_change', 'features', 'lake_change', '', '2022-11-04T12:00:00.000Z', 0, 0, 100, 100, 4326);
        INSERT INTO gpkg_geometry_columns VALUES ('lake_change', 'geom', 'POLYGON', 4326, 0, 0);
        "#,
    )
    .unwrap();

    let mut stmt = conn
        .prepare(r#"INSERT INTO "lake_change" ("geom", "id_lake", "area_ha", "n_obs") VALUES (?1, ?2, ?3, ?4)"#)
        .unwrap();
    for row in rows {
        stmt.execute(params![row.geom, row.id_lake, row.area_ha, row.n_obs])
            .unwrap();
    }
}

/// Rename the `fid` key of a written fixture to `ogc_fid` and add a `fid`
/// TEXT attribute holding `tile_<key>`.
pub fn move_key_to_ogc_fid(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        ALTER TABLE "lake_change" RENAME COLUMN "fid" TO "ogc_fid";
        ALTER TABLE "lake_change" ADD COLUMN "fid" TEXT;
        UPDATE "lake_change" SET "fid" = 'tile_' || "ogc_fid";
        "#,
    )
    .unwrap();
}

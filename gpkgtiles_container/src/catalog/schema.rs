//! Table layouts and fixed rows of the GeoPackage core.

use gpkgtiles_core::{CrsProfile, GlobalGeodeticCrsProfile, SpatialReferenceSystem};

/// `"GP10"` in the SQLite application id field.
pub const GEOPACKAGE_APPLICATION_ID: u32 = 0x4750_3130;

/// GeoPackage version 1.2 in the SQLite user version field.
pub const GEOPACKAGE_USER_VERSION: u32 = 10200;

pub(crate) const CREATE_SPATIAL_REF_SYS: &str = "CREATE TABLE IF NOT EXISTS gpkg_spatial_ref_sys (
	srs_name TEXT NOT NULL,
	srs_id INTEGER NOT NULL PRIMARY KEY,
	organization TEXT NOT NULL,
	organization_coordsys_id INTEGER NOT NULL,
	definition TEXT NOT NULL,
	description TEXT
);";

pub(crate) const CREATE_CONTENTS: &str = "CREATE TABLE IF NOT EXISTS gpkg_contents (
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
);";

/// The three reference systems every GeoPackage must contain.
pub(crate) fn default_reference_systems() -> Vec<SpatialReferenceSystem> {
	vec![
		SpatialReferenceSystem {
			name: String::from("Undefined cartesian SRS"),
			srs_id: -1,
			organization: String::from("NONE"),
			organization_coordsys_id: -1,
			definition: String::from("undefined"),
			description: Some(String::from("undefined cartesian coordinate reference system")),
		},
		SpatialReferenceSystem {
			name: String::from("Undefined geographic SRS"),
			srs_id: 0,
			organization: String::from("NONE"),
			organization_coordsys_id: 0,
			definition: String::from("undefined"),
			description: Some(String::from("undefined geographic coordinate reference system")),
		},
		SpatialReferenceSystem {
			name: String::from(GlobalGeodeticCrsProfile.name()),
			srs_id: 4326,
			organization: String::from("EPSG"),
			organization_coordsys_id: 4326,
			definition: String::from(GlobalGeodeticCrsProfile.well_known_text()),
			description: Some(String::from(
				"longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid",
			)),
		},
	]
}

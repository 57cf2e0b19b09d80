//! Requirements on the SQLite file, the reference system registry and the content registry.

use super::{
	RequirementCheck,
	table_definition::{CONTENTS, SPATIAL_REF_SYS},
};
use crate::{GEOPACKAGE_APPLICATION_ID, storage::StorageHandle};
use anyhow::Result;
use gpkgtiles_core::{Requirement, Severity::*, Timestamp};
use itertools::Itertools;

const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

pub const R1: Requirement = Requirement::new(1, Error, "A GeoPackage SHALL be a SQLite database file");
pub const R2: Requirement = Requirement::new(
	2,
	Error,
	"A GeoPackage SHALL contain 0x47503130 (\"GP10\") in the application id field",
);
pub const R3: Requirement = Requirement::new(3, Warning, "A GeoPackage SHALL have the file extension .gpkg");
pub const R5: Requirement = Requirement::new(5, Error, "PRAGMA integrity_check SHALL return \"ok\"");
pub const R6: Requirement = Requirement::new(6, Error, "PRAGMA foreign_key_check SHALL return an empty result set");
pub const R10: Requirement = Requirement::new(
	10,
	Error,
	"A GeoPackage SHALL include a gpkg_spatial_ref_sys table with the mandatory columns",
);
pub const R11: Requirement = Requirement::new(
	11,
	Error,
	"The gpkg_spatial_ref_sys table SHALL contain the records for srs_id -1, 0 and 4326",
);
pub const R13: Requirement = Requirement::new(
	13,
	Error,
	"A GeoPackage SHALL include a gpkg_contents table with the mandatory columns",
);
pub const R14: Requirement = Requirement::new(
	14,
	Error,
	"The table_name column values in gpkg_contents SHALL reference existing tables or views",
);
pub const R15: Requirement = Requirement::new(
	15,
	Warning,
	"The last_change column values in gpkg_contents SHALL be in ISO 8601 format",
);
pub const R16: Requirement = Requirement::new(
	16,
	Error,
	"The srs_id column values in gpkg_contents SHALL reference values in gpkg_spatial_ref_sys",
);

pub(super) fn checks() -> Vec<RequirementCheck> {
	vec![
		RequirementCheck::new(R1, sqlite_header),
		RequirementCheck::new(R2, application_id),
		RequirementCheck::new(R3, file_extension),
		RequirementCheck::new(R5, integrity),
		RequirementCheck::new(R6, foreign_keys),
		RequirementCheck::new(R10, |handle| SPATIAL_REF_SYS.check(handle)),
		RequirementCheck::new(R11, default_reference_systems),
		RequirementCheck::new(R13, |handle| CONTENTS.check(handle)),
		RequirementCheck::new(R14, content_tables_exist),
		RequirementCheck::new(R15, last_change_format),
		RequirementCheck::new(R16, content_reference_systems),
	]
}

fn sqlite_header(handle: &StorageHandle) -> Result<Option<String>> {
	let header = handle.page_header()?;
	if header == SQLITE_HEADER {
		Ok(None)
	} else {
		Ok(Some(format!(
			"the file header is {:?} instead of \"SQLite format 3\"",
			String::from_utf8_lossy(&header)
		)))
	}
}

fn application_id(handle: &StorageHandle) -> Result<Option<String>> {
	let id = handle.application_id()?;
	if id == GEOPACKAGE_APPLICATION_ID {
		Ok(None)
	} else {
		Ok(Some(format!("the application id is 0x{id:08x}")))
	}
}

fn file_extension(handle: &StorageHandle) -> Result<Option<String>> {
	let extension = handle.path().extension().and_then(|e| e.to_str()).unwrap_or_default();
	if extension.eq_ignore_ascii_case("gpkg") {
		Ok(None)
	} else {
		Ok(Some(format!("the file extension is '{extension}'")))
	}
}

fn integrity(handle: &StorageHandle) -> Result<Option<String>> {
	let messages: Vec<String> = handle.query_map("PRAGMA integrity_check", [], |row| row.get(0))?;
	if messages.len() == 1 && messages[0] == "ok" {
		Ok(None)
	} else {
		Ok(Some(messages.join("; ")))
	}
}

fn foreign_keys(handle: &StorageHandle) -> Result<Option<String>> {
	let violations: Vec<(String, String)> =
		handle.query_map("PRAGMA foreign_key_check", [], |row| Ok((row.get(0)?, row.get(2)?)))?;
	if violations.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!(
			"{} rows violate foreign keys: {}",
			violations.len(),
			violations
				.iter()
				.unique()
				.map(|(table, parent)| format!("{table} -> {parent}"))
				.join(", ")
		)))
	}
}

fn default_reference_systems(handle: &StorageHandle) -> Result<Option<String>> {
	if !handle.table_exists("gpkg_spatial_ref_sys")? {
		return Ok(None);
	}
	let mut missing = Vec::new();
	for (srs_id, organization, code) in [(-1, "NONE", -1), (0, "NONE", 0), (4326, "EPSG", 4326)] {
		let found = handle
			.query_row(
				"SELECT 1 FROM gpkg_spatial_ref_sys WHERE srs_id = ?1 AND organization = ?2 COLLATE NOCASE AND organization_coordsys_id = ?3",
				(srs_id, organization, code),
				|_| Ok(()),
			)?
			.is_some();
		if !found {
			missing.push(srs_id.to_string());
		}
	}
	if missing.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!("missing records for srs_id {}", missing.join(", "))))
	}
}

fn content_table_names(handle: &StorageHandle) -> Result<Option<Vec<String>>> {
	if !handle.table_exists("gpkg_contents")? {
		return Ok(None);
	}
	Ok(Some(handle.query_map(
		"SELECT table_name FROM gpkg_contents ORDER BY table_name",
		[],
		|row| row.get(0),
	)?))
}

fn content_tables_exist(handle: &StorageHandle) -> Result<Option<String>> {
	let Some(names) = content_table_names(handle)? else {
		return Ok(None);
	};
	let mut missing = Vec::new();
	for name in names {
		if !handle.table_or_view_exists(&name)? {
			missing.push(format!("'{name}'"));
		}
	}
	if missing.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!("tables {} do not exist", missing.join(", "))))
	}
}

fn last_change_format(handle: &StorageHandle) -> Result<Option<String>> {
	if !handle.table_exists("gpkg_contents")? {
		return Ok(None);
	}
	let rows: Vec<(String, Option<String>)> = handle.query_map(
		"SELECT table_name, CAST(last_change AS TEXT) FROM gpkg_contents ORDER BY table_name",
		[],
		|row| Ok((row.get(0)?, row.get(1)?)),
	)?;
	let invalid = rows
		.iter()
		.filter(|(_, value)| !value.as_deref().is_some_and(Timestamp::is_valid))
		.map(|(name, value)| format!("'{name}' ({})", value.as_deref().unwrap_or("NULL")))
		.collect::<Vec<_>>();
	if invalid.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!("invalid timestamps for {}", invalid.join(", "))))
	}
}

fn content_reference_systems(handle: &StorageHandle) -> Result<Option<String>> {
	if !handle.table_exists("gpkg_contents")? || !handle.table_exists("gpkg_spatial_ref_sys")? {
		return Ok(None);
	}
	let dangling: Vec<(String, i64)> = handle.query_map(
		"SELECT table_name, srs_id FROM gpkg_contents AS c WHERE srs_id IS NOT NULL
		AND NOT EXISTS (SELECT 1 FROM gpkg_spatial_ref_sys AS s WHERE s.srs_id = c.srs_id) ORDER BY table_name",
		[],
		|row| Ok((row.get(0)?, row.get(1)?)),
	)?;
	if dangling.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!(
			"unknown srs_id for {}",
			dangling
				.iter()
				.map(|(name, srs_id)| format!("'{name}' ({srs_id})"))
				.join(", ")
		)))
	}
}

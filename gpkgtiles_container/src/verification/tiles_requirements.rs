//! Requirements on tile matrix sets, tile matrices and tile pyramid tables.
//!
//! All checks pass trivially when the container holds no tiles at all.

use super::{
	RequirementCheck,
	table_definition::{TILE_MATRIX, TILE_MATRIX_SET, TILE_PYRAMID_COLUMNS, check_columns},
};
use crate::storage::StorageHandle;
use anyhow::Result;
use gpkgtiles_core::{Requirement, Severity::*, quote_identifier};
use itertools::Itertools;

pub const R33: Requirement = Requirement::new(
	33,
	Error,
	"Every tiles content SHALL have a row in gpkg_tile_matrix_set",
);
pub const R34: Requirement = Requirement::new(
	34,
	Error,
	"A GeoPackage with tiles SHALL contain a gpkg_tile_matrix_set table with the mandatory columns",
);
pub const R35: Requirement = Requirement::new(
	35,
	Error,
	"The table_name column values in gpkg_tile_matrix_set SHALL reference tiles rows in gpkg_contents",
);
pub const R37: Requirement = Requirement::new(
	37,
	Error,
	"A GeoPackage with tiles SHALL contain a gpkg_tile_matrix table with the mandatory columns",
);
pub const R41: Requirement = Requirement::new(
	41,
	Error,
	"The zoom_level column values in gpkg_tile_matrix SHALL NOT be negative",
);
pub const R42: Requirement = Requirement::new(
	42,
	Error,
	"The matrix_width and matrix_height column values in gpkg_tile_matrix SHALL be greater than 0",
);
pub const R43: Requirement = Requirement::new(
	43,
	Error,
	"The tile_width and tile_height column values in gpkg_tile_matrix SHALL be greater than 0",
);
pub const R44: Requirement = Requirement::new(
	44,
	Error,
	"The pixel_x_size and pixel_y_size column values in gpkg_tile_matrix SHALL be greater than 0",
);
pub const R54: Requirement = Requirement::new(
	54,
	Error,
	"Each tile pyramid user data table SHALL have the mandatory columns",
);
pub const R55: Requirement = Requirement::new(
	55,
	Error,
	"The zoom_level column values in a tile pyramid table SHALL have a row in gpkg_tile_matrix",
);
pub const R56: Requirement = Requirement::new(
	56,
	Error,
	"The tile_column column values in a tile pyramid table SHALL be in the range of the matrix width",
);
pub const R57: Requirement = Requirement::new(
	57,
	Error,
	"The tile_row column values in a tile pyramid table SHALL be in the range of the matrix height",
);

pub(super) fn checks() -> Vec<RequirementCheck> {
	vec![
		RequirementCheck::new(R33, contents_have_matrix_sets),
		RequirementCheck::new(R34, matrix_set_table),
		RequirementCheck::new(R35, matrix_sets_reference_contents),
		RequirementCheck::new(R37, matrix_table),
		RequirementCheck::new(R41, |handle| {
			matrix_values(handle, "zoom_level < 0", "negative zoom levels")
		}),
		RequirementCheck::new(R42, |handle| {
			matrix_values(handle, "matrix_width < 1 OR matrix_height < 1", "matrix sizes below 1")
		}),
		RequirementCheck::new(R43, |handle| {
			matrix_values(handle, "tile_width < 1 OR tile_height < 1", "tile sizes below 1")
		}),
		RequirementCheck::new(R44, |handle| {
			matrix_values(handle, "NOT (pixel_x_size > 0) OR NOT (pixel_y_size > 0)", "pixel sizes not above 0")
		}),
		RequirementCheck::new(R54, pyramid_tables),
		RequirementCheck::new(R55, tiles_have_matrices),
		RequirementCheck::new(R56, |handle| {
			tiles_in_range(handle, "tile_column", "matrix_width")
		}),
		RequirementCheck::new(R57, |handle| tiles_in_range(handle, "tile_row", "matrix_height")),
	]
}

/// Names of all tiles contents, or an empty list without a content registry.
fn tiles_contents(handle: &StorageHandle) -> Result<Vec<String>> {
	if !handle.table_exists("gpkg_contents")? {
		return Ok(Vec::new());
	}
	handle.query_map(
		"SELECT table_name FROM gpkg_contents WHERE data_type = 'tiles' ORDER BY table_name",
		[],
		|row| row.get(0),
	)
}

/// Tiles contents whose pyramid table exists.
fn pyramid_table_names(handle: &StorageHandle) -> Result<Vec<String>> {
	let mut names = Vec::new();
	for name in tiles_contents(handle)? {
		if handle.table_exists(&name)? {
			names.push(name);
		}
	}
	Ok(names)
}

fn has_tiles(handle: &StorageHandle) -> Result<bool> {
	Ok(!tiles_contents(handle)?.is_empty() || handle.table_exists("gpkg_tile_matrix_set")?)
}

fn quoted_list(names: &[String]) -> String {
	names.iter().map(|name| format!("'{name}'")).join(", ")
}

fn contents_have_matrix_sets(handle: &StorageHandle) -> Result<Option<String>> {
	let contents = tiles_contents(handle)?;
	if contents.is_empty() {
		return Ok(None);
	}
	if !handle.table_exists("gpkg_tile_matrix_set")? {
		return Ok(Some(format!(
			"gpkg_tile_matrix_set is missing for {}",
			quoted_list(&contents)
		)));
	}
	let missing: Vec<String> = handle.query_map(
		"SELECT table_name FROM gpkg_contents WHERE data_type = 'tiles'
		AND table_name NOT IN (SELECT table_name FROM gpkg_tile_matrix_set) ORDER BY table_name",
		[],
		|row| row.get(0),
	)?;
	if missing.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!("no tile matrix set for {}", quoted_list(&missing))))
	}
}

fn matrix_set_table(handle: &StorageHandle) -> Result<Option<String>> {
	if !has_tiles(handle)? {
		return Ok(None);
	}
	TILE_MATRIX_SET.check(handle)
}

fn matrix_sets_reference_contents(handle: &StorageHandle) -> Result<Option<String>> {
	if !handle.table_exists("gpkg_tile_matrix_set")? {
		return Ok(None);
	}
	let sql = if handle.table_exists("gpkg_contents")? {
		"SELECT table_name FROM gpkg_tile_matrix_set WHERE table_name NOT IN
		(SELECT table_name FROM gpkg_contents WHERE data_type = 'tiles') ORDER BY table_name"
	} else {
		"SELECT table_name FROM gpkg_tile_matrix_set ORDER BY table_name"
	};
	let orphans: Vec<String> = handle.query_map(sql, [], |row| row.get(0))?;
	if orphans.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!("no tiles content for {}", quoted_list(&orphans))))
	}
}

fn matrix_table(handle: &StorageHandle) -> Result<Option<String>> {
	if !has_tiles(handle)? {
		return Ok(None);
	}
	TILE_MATRIX.check(handle)
}

fn matrix_values(handle: &StorageHandle, condition: &str, description: &str) -> Result<Option<String>> {
	if !handle.table_exists("gpkg_tile_matrix")? {
		return Ok(None);
	}
	let sql = format!("SELECT table_name, zoom_level FROM gpkg_tile_matrix WHERE {condition} ORDER BY table_name, zoom_level");
	let rows: Vec<(String, i64)> = handle.query_map(&sql, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
	if rows.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!(
			"{description} in {}",
			rows.iter().map(|(name, zoom)| format!("'{name}' zoom level {zoom}")).join(", ")
		)))
	}
}

fn pyramid_tables(handle: &StorageHandle) -> Result<Option<String>> {
	let mut problems = Vec::new();
	for name in pyramid_table_names(handle)? {
		if let Some(problem) = check_columns(handle, &name, TILE_PYRAMID_COLUMNS)? {
			problems.push(problem);
		}
	}
	if problems.is_empty() {
		Ok(None)
	} else {
		Ok(Some(problems.join("; ")))
	}
}

fn tiles_have_matrices(handle: &StorageHandle) -> Result<Option<String>> {
	if !handle.table_exists("gpkg_tile_matrix")? {
		return Ok(None);
	}
	let mut problems = Vec::new();
	for name in pyramid_table_names(handle)? {
		let sql = format!(
			"SELECT DISTINCT zoom_level FROM {} WHERE zoom_level NOT IN
			(SELECT zoom_level FROM gpkg_tile_matrix WHERE table_name = ?1) ORDER BY zoom_level",
			quote_identifier(&name)
		);
		let zooms: Vec<i64> = handle.query_map(&sql, [&name], |row| row.get(0))?;
		if !zooms.is_empty() {
			problems.push(format!("'{name}' zoom levels {}", zooms.iter().join(", ")));
		}
	}
	if problems.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!("tiles without tile matrix: {}", problems.join("; "))))
	}
}

fn tiles_in_range(handle: &StorageHandle, index_column: &str, size_column: &str) -> Result<Option<String>> {
	if !handle.table_exists("gpkg_tile_matrix")? {
		return Ok(None);
	}
	let mut problems = Vec::new();
	for name in pyramid_table_names(handle)? {
		let sql = format!(
			"SELECT COUNT(*) FROM {} AS t JOIN gpkg_tile_matrix AS m
			ON m.table_name = ?1 AND m.zoom_level = t.zoom_level
			WHERE t.{index_column} < 0 OR t.{index_column} >= m.{size_column}",
			quote_identifier(&name)
		);
		let count: i64 = handle
			.query_row(&sql, [&name], |row| row.get(0))?
			.unwrap_or_default();
		if count > 0 {
			problems.push(format!("'{name}' has {count} tiles outside of the matrix"));
		}
	}
	if problems.is_empty() {
		Ok(None)
	} else {
		Ok(Some(problems.join("; ")))
	}
}

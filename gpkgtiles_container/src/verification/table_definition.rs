//! Expected column layouts of the GeoPackage tables.

use crate::storage::{ColumnInfo, StorageHandle};
use anyhow::Result;
use itertools::Itertools;

#[derive(Clone, Copy, Debug)]
pub struct ColumnDefinition {
	pub name: &'static str,
	pub sql_type: &'static str,
	pub not_null: bool,
	pub primary_key: bool,
}

const fn column(name: &'static str, sql_type: &'static str, not_null: bool, primary_key: bool) -> ColumnDefinition {
	ColumnDefinition {
		name,
		sql_type,
		not_null,
		primary_key,
	}
}

#[derive(Clone, Copy, Debug)]
pub struct TableDefinition {
	pub name: &'static str,
	pub columns: &'static [ColumnDefinition],
}

pub const SPATIAL_REF_SYS: TableDefinition = TableDefinition {
	name: "gpkg_spatial_ref_sys",
	columns: &[
		column("srs_name", "TEXT", true, false),
		column("srs_id", "INTEGER", true, true),
		column("organization", "TEXT", true, false),
		column("organization_coordsys_id", "INTEGER", true, false),
		column("definition", "TEXT", true, false),
		column("description", "TEXT", false, false),
	],
};

pub const CONTENTS: TableDefinition = TableDefinition {
	name: "gpkg_contents",
	columns: &[
		column("table_name", "TEXT", true, true),
		column("data_type", "TEXT", true, false),
		column("identifier", "TEXT", false, false),
		column("description", "TEXT", false, false),
		column("last_change", "DATETIME", true, false),
		column("min_x", "DOUBLE", false, false),
		column("min_y", "DOUBLE", false, false),
		column("max_x", "DOUBLE", false, false),
		column("max_y", "DOUBLE", false, false),
		column("srs_id", "INTEGER", false, false),
	],
};

pub const TILE_MATRIX_SET: TableDefinition = TableDefinition {
	name: "gpkg_tile_matrix_set",
	columns: &[
		column("table_name", "TEXT", true, true),
		column("srs_id", "INTEGER", true, false),
		column("min_x", "DOUBLE", true, false),
		column("min_y", "DOUBLE", true, false),
		column("max_x", "DOUBLE", true, false),
		column("max_y", "DOUBLE", true, false),
	],
};

pub const TILE_MATRIX: TableDefinition = TableDefinition {
	name: "gpkg_tile_matrix",
	columns: &[
		column("table_name", "TEXT", true, true),
		column("zoom_level", "INTEGER", true, true),
		column("matrix_width", "INTEGER", true, false),
		column("matrix_height", "INTEGER", true, false),
		column("tile_width", "INTEGER", true, false),
		column("tile_height", "INTEGER", true, false),
		column("pixel_x_size", "DOUBLE", true, false),
		column("pixel_y_size", "DOUBLE", true, false),
	],
};

/// Layout of a tile pyramid table; the name varies per tile set.
pub const TILE_PYRAMID_COLUMNS: &[ColumnDefinition] = &[
	column("id", "INTEGER", false, true),
	column("zoom_level", "INTEGER", true, false),
	column("tile_column", "INTEGER", true, false),
	column("tile_row", "INTEGER", true, false),
	column("tile_data", "BLOB", true, false),
];

fn normalize_type(sql_type: &str) -> String {
	let upper = sql_type.trim().to_ascii_uppercase();
	match upper.as_str() {
		"REAL" | "FLOAT" | "DOUBLE" => String::from("DOUBLE"),
		_ => upper,
	}
}

impl ColumnDefinition {
	fn mismatch(&self, actual: &ColumnInfo) -> Option<String> {
		let mut problems = Vec::new();
		if normalize_type(&actual.sql_type) != normalize_type(self.sql_type) {
			problems.push(format!("type is '{}' instead of '{}'", actual.sql_type, self.sql_type));
		}
		// the primary key of a rowid table is implicitly not null
		if self.not_null && !actual.not_null && actual.primary_key == 0 {
			problems.push(String::from("is not declared NOT NULL"));
		}
		if self.primary_key && actual.primary_key == 0 {
			problems.push(String::from("is not part of the primary key"));
		}
		if problems.is_empty() {
			None
		} else {
			Some(format!("column '{}' {}", self.name, problems.join(" and ")))
		}
	}
}

/// Compares the columns of `table` with `expected`. Returns a reason if they differ.
pub fn check_columns(handle: &StorageHandle, table: &str, expected: &[ColumnDefinition]) -> Result<Option<String>> {
	let actual = handle.column_info(table)?;
	if actual.is_empty() {
		return Ok(Some(format!("table '{table}' does not exist")));
	}
	let problems = expected
		.iter()
		.filter_map(|definition| {
			match actual
				.iter()
				.find(|column| column.name.eq_ignore_ascii_case(definition.name))
			{
				Some(column) => definition.mismatch(column),
				None => Some(format!("column '{}' is missing", definition.name)),
			}
		})
		.collect::<Vec<_>>();
	if problems.is_empty() {
		Ok(None)
	} else {
		Ok(Some(format!("table '{table}': {}", problems.iter().join(", "))))
	}
}

impl TableDefinition {
	pub fn check(&self, handle: &StorageHandle) -> Result<Option<String>> {
		check_columns(handle, self.name, self.columns)
	}
}

use gpkgtiles_core::Identifier;

pub(crate) const CREATE_TILE_MATRIX_SET: &str = "CREATE TABLE IF NOT EXISTS gpkg_tile_matrix_set (
	table_name TEXT NOT NULL PRIMARY KEY,
	srs_id INTEGER NOT NULL,
	min_x DOUBLE NOT NULL,
	min_y DOUBLE NOT NULL,
	max_x DOUBLE NOT NULL,
	max_y DOUBLE NOT NULL,
	CONSTRAINT fk_gtms_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
	CONSTRAINT fk_gtms_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys (srs_id)
);";

pub(crate) const CREATE_TILE_MATRIX: &str = "CREATE TABLE IF NOT EXISTS gpkg_tile_matrix (
	table_name TEXT NOT NULL,
	zoom_level INTEGER NOT NULL,
	matrix_width INTEGER NOT NULL,
	matrix_height INTEGER NOT NULL,
	tile_width INTEGER NOT NULL,
	tile_height INTEGER NOT NULL,
	pixel_x_size DOUBLE NOT NULL,
	pixel_y_size DOUBLE NOT NULL,
	CONSTRAINT pk_ttm PRIMARY KEY (table_name, zoom_level),
	CONSTRAINT fk_tmm_table_name FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name)
);";

/// Statement creating the tile pyramid table of one tile set.
pub(crate) fn create_pyramid_table(table_name: &Identifier) -> String {
	format!(
		"CREATE TABLE {} (
	id INTEGER PRIMARY KEY AUTOINCREMENT,
	zoom_level INTEGER NOT NULL,
	tile_column INTEGER NOT NULL,
	tile_row INTEGER NOT NULL,
	tile_data BLOB NOT NULL,
	UNIQUE (zoom_level, tile_column, tile_row)
);",
		table_name.quoted()
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pyramid_table_is_quoted() {
		let sql = create_pyramid_table(&Identifier::new("ortho_2024").unwrap());
		assert!(sql.starts_with("CREATE TABLE \"ortho_2024\" ("));
		assert!(sql.contains("UNIQUE (zoom_level, tile_column, tile_row)"));
	}
}

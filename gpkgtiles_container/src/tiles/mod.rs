//! Raster tile pyramids: tile sets, tile matrices and tiles.
//!
//! A tile set is a table registered in `gpkg_contents` with data type `tiles`, a row in
//! `gpkg_tile_matrix_set` describing its grid, any number of `gpkg_tile_matrix` rows (one per
//! zoom level) and the pyramid table holding the tile images.
//!
//! Registrations follow add-or-get semantics like [`GeoPackageCore`](crate::GeoPackageCore).
//! Tile rows are never replaced: inserting a second tile at the same index fails with
//! [`GpkgError::StorageUniqueness`].

mod iterator;
pub use iterator::*;

mod schema;

#[cfg(test)]
mod tests;

use crate::{
	catalog::{self, NewContent},
	storage::{StorageHandle, is_unique_violation, queries},
};
use anyhow::{Context, Result, anyhow};
use gpkgtiles_core::{
	BoundingBox, CoordinateConverter, CrsCoordinate, DataType, GpkgError, Identifier, RelativeTileCoordinate,
	SpatialReferenceSystem, Tile, TileData, TileMatrix, TileMatrixSet, TileSet, TileSetState, bail_argument,
	ensure_argument, invalid_argument, quote_identifier,
};
use gpkgtiles_derive::context;
use r2d2_sqlite::rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeSet;

const SELECT_TILE_MATRIX: &str = "SELECT table_name, zoom_level, matrix_width, matrix_height, tile_width, tile_height,
	pixel_x_size, pixel_y_size FROM gpkg_tile_matrix";

/// Tile pyramid operations on one container.
#[derive(Clone, Copy, Debug)]
pub struct GeoPackageTiles<'a> {
	handle: &'a StorageHandle,
}

impl<'a> GeoPackageTiles<'a> {
	#[must_use]
	pub fn new(handle: &'a StorageHandle) -> Self {
		Self { handle }
	}

	/// Creates a tile set with its pyramid table, content row and tile matrix set, or returns
	/// the identical tile set already registered under `table_name`.
	///
	/// # Errors
	/// Fails with an invalid-argument error if the name is not a valid identifier, the
	/// bounding box has no area, the reference system is not registered, or a table or
	/// content row with that name exists with different values.
	#[context("adding tile set '{}'", table_name)]
	pub fn add_tile_set(
		&self,
		table_name: &str,
		identifier: &str,
		description: &str,
		bounding_box: &BoundingBox,
		srs: &SpatialReferenceSystem,
	) -> Result<TileSet> {
		let table_name = Identifier::new(table_name)?;
		ensure_argument!(
			bounding_box.has_area(),
			"bounding box {bounding_box:?} of a tile set must have an area"
		);

		self.handle.with_transaction(|tx| {
			tx.execute_batch(schema::CREATE_TILE_MATRIX_SET)?;
			tx.execute_batch(schema::CREATE_TILE_MATRIX)?;

			let content = NewContent {
				table_name: &table_name,
				data_type: &DataType::Tiles,
				identifier,
				description,
				bounding_box: Some(bounding_box),
				srs: Some(srs),
			};

			if let Some(existing) = catalog::content(tx, table_name.as_str())? {
				ensure_argument!(
					content.matches(&existing),
					"content '{table_name}' is already registered with different values"
				);
				let existing = TileSet::try_from(existing)?;
				ensure_argument!(
					tile_matrix_set(tx, &existing)?.is_some_and(|set| set.bounding_box == *bounding_box),
					"tile set '{table_name}' has a different tile matrix set"
				);
				log::trace!("tile set '{table_name}' already exists");
				return Ok(existing);
			}
			ensure_argument!(
				!queries::table_or_view_exists(tx, table_name.as_str())?,
				"a table named '{table_name}' already exists"
			);

			log::debug!("create tile pyramid table '{table_name}'");
			tx.execute_batch(&schema::create_pyramid_table(&table_name))?;
			let tile_set = TileSet::try_from(catalog::add_content(tx, &content)?)?;

			let bbox = bounding_box.as_array();
			tx.execute(
				"INSERT INTO gpkg_tile_matrix_set (table_name, srs_id, min_x, min_y, max_x, max_y)
				VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
				params![table_name.as_str(), srs.srs_id, bbox[0], bbox[1], bbox[2], bbox[3]],
			)?;
			Ok(tile_set)
		})
	}

	/// Looks up a tile set by its table name. Contents of other data types are not tile sets.
	pub fn get_tile_set(&self, table_name: &str) -> Result<Option<TileSet>> {
		tile_set(&*self.handle.connection()?, table_name)
	}

	/// All tile sets, optionally restricted to one reference system, ordered by table name.
	pub fn get_tile_sets(&self, srs: Option<&SpatialReferenceSystem>) -> Result<Vec<TileSet>> {
		let conn = self.handle.connection()?;
		catalog::contents(&conn, Some(&DataType::Tiles))?
			.into_iter()
			.filter(|content| srs.is_none_or(|srs| content.srs_id == Some(srs.srs_id)))
			.map(TileSet::try_from)
			.collect()
	}

	/// The grid definition of a tile set.
	pub fn get_tile_matrix_set(&self, tile_set: &TileSet) -> Result<TileMatrixSet> {
		tile_matrix_set(&*self.handle.connection()?, tile_set)?
			.ok_or_else(|| invalid_argument!("tile set '{}' has no tile matrix set", tile_set.table_name))
	}

	/// Defines the zoom level `zoom_level` of a tile set, or returns the identical matrix
	/// already defined there.
	///
	/// Pixel sizes are derived from the tile matrix set bounding box when `pixel_size` is
	/// `None`.
	#[context("adding tile matrix {} to '{}'", zoom_level, matrix_set.table_name)]
	pub fn add_tile_matrix(
		&self,
		matrix_set: &TileMatrixSet,
		zoom_level: u32,
		matrix_width: u32,
		matrix_height: u32,
		tile_width: u32,
		tile_height: u32,
		pixel_size: Option<(f64, f64)>,
	) -> Result<TileMatrix> {
		let matrix = match pixel_size {
			Some((pixel_x_size, pixel_y_size)) => TileMatrix::new(
				&matrix_set.table_name,
				zoom_level,
				matrix_width,
				matrix_height,
				tile_width,
				tile_height,
				pixel_x_size,
				pixel_y_size,
			)?,
			None => TileMatrix::with_derived_pixel_size(
				&matrix_set.table_name,
				zoom_level,
				matrix_width,
				matrix_height,
				tile_width,
				tile_height,
				&matrix_set.bounding_box,
			)?,
		};

		self.handle.with_transaction(|tx| {
			ensure_argument!(
				stored_tile_matrix_set_exists(tx, &matrix_set.table_name)?,
				"tile set '{}' does not exist",
				matrix_set.table_name
			);
			if let Some(existing) = tile_matrix(tx, &matrix_set.table_name, zoom_level)? {
				ensure_argument!(
					existing.same_definition(&matrix),
					"zoom level {zoom_level} of '{}' is already defined with different values",
					matrix_set.table_name
				);
				return Ok(existing);
			}

			log::debug!(
				"add tile matrix {zoom_level} ({matrix_width}x{matrix_height}) to '{}'",
				matrix_set.table_name
			);
			tx.execute(
				"INSERT INTO gpkg_tile_matrix (table_name, zoom_level, matrix_width, matrix_height, tile_width,
				tile_height, pixel_x_size, pixel_y_size) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
				params![
					matrix.table_name,
					matrix.zoom_level,
					matrix.matrix_width,
					matrix.matrix_height,
					matrix.tile_width,
					matrix.tile_height,
					matrix.pixel_x_size,
					matrix.pixel_y_size
				],
			)?;
			tile_matrix(tx, &matrix_set.table_name, zoom_level)?
				.ok_or_else(|| anyhow!("tile matrix {zoom_level} vanished after insert"))
		})
	}

	pub fn get_tile_matrix(&self, tile_set: &TileSet, zoom_level: u32) -> Result<Option<TileMatrix>> {
		tile_matrix(&*self.handle.connection()?, &tile_set.table_name, zoom_level)
	}

	/// All tile matrices of a tile set, ordered by zoom level.
	pub fn get_tile_matrices(&self, tile_set: &TileSet) -> Result<Vec<TileMatrix>> {
		let conn = self.handle.connection()?;
		if !queries::table_exists(&conn, "gpkg_tile_matrix")? {
			return Ok(Vec::new());
		}
		let mut statement = conn.prepare(&format!("{SELECT_TILE_MATRIX} WHERE table_name = ?1 ORDER BY zoom_level"))?;
		let rows = statement
			.query_map(params![tile_set.table_name], read_tile_matrix)?
			.collect::<Result<Vec<_>, _>>()?;
		rows.into_iter().map(into_tile_matrix).collect()
	}

	/// Zoom levels that have a tile matrix.
	pub fn get_zoom_levels(&self, tile_set: &TileSet) -> Result<BTreeSet<u32>> {
		Ok(self
			.get_tile_matrices(tile_set)?
			.into_iter()
			.map(|matrix| matrix.zoom_level)
			.collect())
	}

	/// Stores one tile image.
	///
	/// # Errors
	/// Fails with an invalid-argument error if `data` is empty, the index is outside the
	/// matrix, or the matrix is not stored for this tile set, and with
	/// [`GpkgError::StorageUniqueness`] if the index is already occupied.
	#[context("adding tile {}/{}/{} to '{}'", matrix.zoom_level, column, row, tile_set.table_name)]
	pub fn add_tile(
		&self,
		tile_set: &TileSet,
		matrix: &TileMatrix,
		column: u32,
		row: u32,
		data: &TileData,
	) -> Result<Tile> {
		ensure_argument!(!data.is_empty(), "tile data must not be empty");
		ensure_argument!(
			matrix.table_name == tile_set.table_name,
			"tile matrix of '{}' does not belong to tile set '{}'",
			matrix.table_name,
			tile_set.table_name
		);
		ensure_argument!(
			matrix.contains(column, row),
			"tile ({column}, {row}) is outside of the {}x{} matrix",
			matrix.matrix_width,
			matrix.matrix_height
		);

		self.handle.with_transaction(|tx| {
			let stored = tile_matrix(tx, &tile_set.table_name, matrix.zoom_level)?.ok_or_else(|| {
				invalid_argument!(
					"tile set '{}' has no tile matrix at zoom level {}",
					tile_set.table_name,
					matrix.zoom_level
				)
			})?;
			ensure_argument!(
				stored.same_definition(matrix),
				"tile matrix {} differs from the stored one",
				matrix.zoom_level
			);

			let sql = format!(
				"INSERT INTO {} (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
				quote_identifier(&tile_set.table_name)
			);
			tx.execute(&sql, params![matrix.zoom_level, column, row, data.as_slice()])
				.map_err(|err| {
					if is_unique_violation(&err) {
						anyhow::Error::new(GpkgError::StorageUniqueness(format!(
							"tile {}/{column}/{row} already exists in '{}'",
							matrix.zoom_level, tile_set.table_name
						)))
					} else {
						anyhow::Error::new(err)
					}
				})?;

			log::trace!("add tile {}/{column}/{row} ({} bytes)", matrix.zoom_level, data.len());
			Ok(Tile {
				id: tx.last_insert_rowid(),
				zoom_level: matrix.zoom_level,
				column,
				row,
				data: data.clone(),
			})
		})
	}

	/// Stores one tile image at the tile containing `coordinate`.
	pub fn add_tile_at(
		&self,
		tile_set: &TileSet,
		matrix: &TileMatrix,
		coordinate: &CrsCoordinate,
		precision: u32,
		data: &TileData,
	) -> Result<Tile> {
		let matrix_set = self.get_tile_matrix_set(tile_set)?;
		let index = CoordinateConverter::new(&matrix_set).crs_to_relative(matrix, coordinate, precision)?;
		self.add_tile(tile_set, matrix, index.column, index.row, data)
	}

	/// Reads one tile.
	///
	/// Returns `None` if there is no tile matrix at `zoom_level` or no tile at the index.
	///
	/// # Errors
	/// Fails with an invalid-argument error if the matrix exists and the index is outside it.
	pub fn get_tile(&self, tile_set: &TileSet, column: u32, row: u32, zoom_level: u32) -> Result<Option<Tile>> {
		let conn = self.handle.connection()?;
		let Some(matrix) = tile_matrix(&conn, &tile_set.table_name, zoom_level)? else {
			return Ok(None);
		};
		ensure_argument!(
			matrix.contains(column, row),
			"tile ({column}, {row}) is outside of the {}x{} matrix at zoom level {zoom_level}",
			matrix.matrix_width,
			matrix.matrix_height
		);
		read_tile_at(&conn, &tile_set.table_name, zoom_level, column, row)
	}

	/// Reads the tile containing `coordinate`.
	///
	/// # Errors
	/// Fails with an invalid-argument error if there is no tile matrix at `zoom_level` or the
	/// coordinate is outside the tile set.
	pub fn get_tile_at(
		&self,
		tile_set: &TileSet,
		coordinate: &CrsCoordinate,
		precision: u32,
		zoom_level: u32,
	) -> Result<Option<Tile>> {
		let index = self.get_tile_coordinate(tile_set, coordinate, precision, zoom_level)?;
		read_tile_at(
			&*self.handle.connection()?,
			&tile_set.table_name,
			zoom_level,
			index.column,
			index.row,
		)
	}

	/// The index of the tile containing `coordinate` at `zoom_level`.
	pub fn get_tile_coordinate(
		&self,
		tile_set: &TileSet,
		coordinate: &CrsCoordinate,
		precision: u32,
		zoom_level: u32,
	) -> Result<RelativeTileCoordinate> {
		let matrix = self.require_tile_matrix(tile_set, zoom_level)?;
		let matrix_set = self.get_tile_matrix_set(tile_set)?;
		CoordinateConverter::new(&matrix_set).crs_to_relative(&matrix, coordinate, precision)
	}

	/// The upper left corner of a tile.
	pub fn get_crs_coordinate(&self, tile_set: &TileSet, column: u32, row: u32, zoom_level: u32) -> Result<CrsCoordinate> {
		let matrix = self.require_tile_matrix(tile_set, zoom_level)?;
		let matrix_set = self.get_tile_matrix_set(tile_set)?;
		CoordinateConverter::new(&matrix_set).relative_to_crs(&matrix, RelativeTileCoordinate::new(column, row))
	}

	/// The extent covered by one tile.
	pub fn get_tile_bounds(&self, tile_set: &TileSet, matrix: &TileMatrix, column: u32, row: u32) -> Result<BoundingBox> {
		let matrix_set = self.get_tile_matrix_set(tile_set)?;
		CoordinateConverter::new(&matrix_set).tile_bounds(matrix, RelativeTileCoordinate::new(column, row))
	}

	/// The range of occupied indices at one zoom level as `(min_column, min_row, max_column,
	/// max_row)`, or `None` if the zoom level holds no tiles.
	pub fn get_tile_set_bounds_at(&self, tile_set: &TileSet, zoom_level: u32) -> Result<Option<(u32, u32, u32, u32)>> {
		let sql = format!(
			"SELECT MIN(tile_column), MIN(tile_row), MAX(tile_column), MAX(tile_row) FROM {} WHERE zoom_level = ?1",
			quote_identifier(&tile_set.table_name)
		);
		let bounds: Option<(Option<u32>, Option<u32>, Option<u32>, Option<u32>)> =
			self.handle.query_row(&sql, params![zoom_level], |row| {
				Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
			})?;
		Ok(match bounds {
			Some((Some(x0), Some(y0), Some(x1), Some(y1))) => Some((x0, y0, x1, y1)),
			_ => None,
		})
	}

	/// Number of stored tiles, over all zoom levels.
	pub fn count_tiles(&self, tile_set: &TileSet) -> Result<u64> {
		queries::row_count(&*self.handle.connection()?, &tile_set.table_name)
	}

	/// Number of stored tiles at one zoom level.
	pub fn count_tiles_at(&self, tile_set: &TileSet, zoom_level: u32) -> Result<u64> {
		let sql = format!(
			"SELECT COUNT(*) FROM {} WHERE zoom_level = ?1",
			quote_identifier(&tile_set.table_name)
		);
		let count: Option<i64> = self.handle.query_row(&sql, params![zoom_level], |row| row.get(0))?;
		Ok(count.unwrap_or(0) as u64)
	}

	/// Iterates over the stored tiles in insertion order, optionally restricted to one zoom
	/// level. Each call starts a fresh pass.
	pub fn tiles(&self, tile_set: &TileSet, zoom_level: Option<u32>) -> Result<TileIterator<'a>> {
		ensure_argument!(
			self.handle.table_exists(&tile_set.table_name)?,
			"tile pyramid table '{}' does not exist",
			tile_set.table_name
		);
		Ok(TileIterator::new(self.handle, &tile_set.table_name, zoom_level))
	}

	pub fn tile_set_state(&self, tile_set: &TileSet) -> Result<TileSetState> {
		if self.count_tiles(tile_set)? > 0 {
			Ok(TileSetState::Populated)
		} else if self.get_tile_matrices(tile_set)?.is_empty() {
			Ok(TileSetState::Registered)
		} else {
			Ok(TileSetState::Defined)
		}
	}

	fn require_tile_matrix(&self, tile_set: &TileSet, zoom_level: u32) -> Result<TileMatrix> {
		self.get_tile_matrix(tile_set, zoom_level)?.ok_or_else(|| {
			invalid_argument!(
				"tile set '{}' has no tile matrix at zoom level {zoom_level}",
				tile_set.table_name
			)
		})
	}
}

pub(crate) fn tile_set(conn: &Connection, table_name: &str) -> Result<Option<TileSet>> {
	match catalog::content(conn, table_name)? {
		Some(content) if content.data_type == DataType::Tiles => Ok(Some(TileSet::try_from(content)?)),
		_ => Ok(None),
	}
}

fn stored_tile_matrix_set_exists(conn: &Connection, table_name: &str) -> Result<bool> {
	if !queries::table_exists(conn, "gpkg_tile_matrix_set")? {
		return Ok(false);
	}
	let found: Option<i64> = conn
		.query_row(
			"SELECT 1 FROM gpkg_tile_matrix_set WHERE table_name = ?1",
			params![table_name],
			|row| row.get(0),
		)
		.optional()?;
	Ok(found.is_some())
}

pub(crate) fn tile_matrix_set(conn: &Connection, tile_set: &TileSet) -> Result<Option<TileMatrixSet>> {
	if !queries::table_exists(conn, "gpkg_tile_matrix_set")? {
		return Ok(None);
	}
	let row: Option<(i32, f64, f64, f64, f64)> = conn
		.query_row(
			"SELECT srs_id, min_x, min_y, max_x, max_y FROM gpkg_tile_matrix_set WHERE table_name = ?1",
			params![tile_set.table_name],
			|row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
		)
		.optional()?;
	let Some((srs_id, min_x, min_y, max_x, max_y)) = row else {
		return Ok(None);
	};
	let Some(srs) = catalog::spatial_reference_system(conn, srs_id)? else {
		bail_argument!(
			"tile matrix set of '{}' references the unknown srs_id {srs_id}",
			tile_set.table_name
		);
	};
	Ok(Some(TileMatrixSet {
		table_name: tile_set.table_name.clone(),
		srs,
		bounding_box: BoundingBox::new(min_x, min_y, max_x, max_y)?,
	}))
}

type TileMatrixRow = (String, u32, u32, u32, u32, u32, f64, f64);

fn read_tile_matrix(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<TileMatrixRow> {
	Ok((
		row.get(0)?,
		row.get(1)?,
		row.get(2)?,
		row.get(3)?,
		row.get(4)?,
		row.get(5)?,
		row.get(6)?,
		row.get(7)?,
	))
}

/// Stored rows may come from files opened without verification.
fn into_tile_matrix(row: TileMatrixRow) -> Result<TileMatrix> {
	let (table_name, zoom_level, matrix_width, matrix_height, tile_width, tile_height, pixel_x_size, pixel_y_size) = row;
	TileMatrix::new(
		&table_name,
		zoom_level,
		matrix_width,
		matrix_height,
		tile_width,
		tile_height,
		pixel_x_size,
		pixel_y_size,
	)
	.with_context(|| format!("reading tile matrix {zoom_level} of '{table_name}'"))
}

pub(crate) fn tile_matrix(conn: &Connection, table_name: &str, zoom_level: u32) -> Result<Option<TileMatrix>> {
	if !queries::table_exists(conn, "gpkg_tile_matrix")? {
		return Ok(None);
	}
	let sql = format!("{SELECT_TILE_MATRIX} WHERE table_name = ?1 AND zoom_level = ?2");
	conn
		.query_row(&sql, params![table_name, zoom_level], read_tile_matrix)
		.optional()?
		.map(into_tile_matrix)
		.transpose()
}

fn read_tile_at(conn: &Connection, table_name: &str, zoom_level: u32, column: u32, row: u32) -> Result<Option<Tile>> {
	let sql = format!(
		"SELECT id, zoom_level, tile_column, tile_row, tile_data FROM {}
		WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
		quote_identifier(table_name)
	);
	Ok(conn
		.query_row(&sql, params![zoom_level, column, row], iterator::read_tile)
		.optional()?)
}

//! Conversions between reference system coordinates and tile indices.
//!
//! Three coordinate spaces are involved:
//! * reference system coordinates ([`CrsCoordinate`]),
//! * relative tile coordinates: (column, row) inside one [`TileMatrix`] of a tile set,
//! * absolute tile coordinates: (zoom, x, y) in the global grid of a [`CrsProfile`].
//!
//! All conversions are pure. Indices always count from the upper left corner; points on an
//! interior grid line belong to the tile to the right of or below the line, points on the
//! outer maximum edges belong to the last column or row.


use crate::{
	AbsoluteTileCoordinate, BoundingBox, CrsCoordinate, CrsProfile, RelativeTileCoordinate, TileMatrix,
	TileMatrixDimensions, TileMatrixSet, TileOrigin, ensure_argument, invalid_argument, profile::ensure_crs,
};
use anyhow::Result;
use gpkgtiles_derive::context;

/// Distance to a grid line, in tiles, below which a difference is floating point noise.
const GRID_EPSILON: f64 = 1e-12;

/// Maps an offset along an axis of length `extent` onto a tile index in `0..count`.
///
/// The offset comes from a coordinate already rounded to `precision` decimal places. It lies
/// on a grid line only if the line rounds to the same value, i.e. it is closer to the line
/// than half a decimal unit. Every other offset is floored, so points left of or above a
/// line stay in the tile before it.
fn grid_index(offset: f64, extent: f64, count: u32, precision: u32) -> Result<u32> {
	ensure_argument!(count > 0, "a grid needs at least one tile per axis");
	if extent <= 0.0 {
		return Ok(0);
	}
	let tile_size = extent / f64::from(count);
	let scaled = offset / tile_size;
	let nearest = scaled.round();
	let distance = (scaled - nearest).abs();
	let half_unit = 0.5 * 10f64.powi(-(precision.min(15) as i32));
	let index = if distance * tile_size < half_unit || distance <= GRID_EPSILON {
		nearest
	} else {
		scaled.floor()
	};
	Ok((index.max(0.0) as u32).min(count - 1))
}

fn nearly_equal(a: f64, b: f64, precision: u32) -> bool {
	(a - b).abs() <= 10f64.powi(-(precision.min(15) as i32))
}

/// Converts between CRS coordinates and relative tile coordinates of one tile set.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateConverter<'a> {
	matrix_set: &'a TileMatrixSet,
}

impl<'a> CoordinateConverter<'a> {
	#[must_use]
	pub fn new(matrix_set: &'a TileMatrixSet) -> Self {
		Self { matrix_set }
	}

	fn ensure_matrix(&self, matrix: &TileMatrix) -> Result<()> {
		ensure_argument!(
			matrix.table_name == self.matrix_set.table_name,
			"tile matrix of '{}' does not belong to tile set '{}'",
			matrix.table_name,
			self.matrix_set.table_name
		);
		ensure_argument!(
			matrix.matrix_width > 0 && matrix.matrix_height > 0,
			"tile matrix {} has no tiles ({}x{})",
			matrix.zoom_level,
			matrix.matrix_width,
			matrix.matrix_height
		);
		Ok(())
	}

	/// Finds the tile of `matrix` that contains `coordinate`.
	///
	/// The coordinate is rounded to `precision` decimal places first. It must be in the tile
	/// set's reference system and inside its bounding box (edges included).
	#[context("locating {} at zoom level {}", coordinate, matrix.zoom_level)]
	pub fn crs_to_relative(
		&self,
		matrix: &TileMatrix,
		coordinate: &CrsCoordinate,
		precision: u32,
	) -> Result<RelativeTileCoordinate> {
		self.ensure_matrix(matrix)?;
		let crs = self.matrix_set.srs.crs();
		ensure_crs(coordinate, &crs)?;

		let bbox = &self.matrix_set.bounding_box;
		let rounded = coordinate.rounded(precision);
		ensure_argument!(
			bbox.contains(rounded.x, rounded.y),
			"coordinate {rounded} is outside of the tile set bounds {bbox:?}"
		);

		Ok(RelativeTileCoordinate::new(
			grid_index(rounded.x - bbox.min_x, bbox.width(), matrix.matrix_width, precision)?,
			grid_index(bbox.max_y - rounded.y, bbox.height(), matrix.matrix_height, precision)?,
		))
	}

	/// The upper left corner of a tile, in the tile set's reference system.
	pub fn relative_to_crs(&self, matrix: &TileMatrix, tile: RelativeTileCoordinate) -> Result<CrsCoordinate> {
		let bounds = self.tile_bounds(matrix, tile)?;
		Ok(CrsCoordinate::new(bounds.min_x, bounds.max_y, self.matrix_set.srs.crs()))
	}

	/// The extent covered by one tile.
	pub fn tile_bounds(&self, matrix: &TileMatrix, tile: RelativeTileCoordinate) -> Result<BoundingBox> {
		self.ensure_matrix(matrix)?;
		ensure_argument!(
			matrix.contains(tile.column, tile.row),
			"tile {tile} is outside of the {}x{} matrix at zoom level {}",
			matrix.matrix_width,
			matrix.matrix_height,
			matrix.zoom_level
		);
		let bbox = &self.matrix_set.bounding_box;
		let (tile_width, tile_height) = matrix.tile_size(bbox);
		let min_x = bbox.min_x + f64::from(tile.column) * tile_width;
		let max_y = bbox.max_y - f64::from(tile.row) * tile_height;
		let max_x = if tile.column + 1 == matrix.matrix_width {
			bbox.max_x
		} else {
			min_x + tile_width
		};
		let min_y = if tile.row + 1 == matrix.matrix_height {
			bbox.min_y
		} else {
			max_y - tile_height
		};
		BoundingBox::new(min_x, min_y, max_x, max_y)
	}
}

/// Finds the tile of a profile's global grid at `zoom` that contains `coordinate`.
pub fn crs_to_absolute(
	profile: &dyn CrsProfile,
	coordinate: &CrsCoordinate,
	zoom: u32,
	origin: TileOrigin,
) -> Result<AbsoluteTileCoordinate> {
	ensure_crs(coordinate, &profile.crs())?;
	let bounds = profile.bounds();
	let rounded = coordinate.rounded(profile.precision());
	ensure_argument!(
		bounds.contains(rounded.x, rounded.y),
		"coordinate {rounded} is outside of the bounds of {}",
		profile.crs()
	);
	let dimensions = profile.tile_scheme().dimensions(zoom)?;
	let precision = profile.precision();
	let x = grid_index(rounded.x - bounds.min_x, bounds.width(), dimensions.width, precision)?;
	let y = grid_index(bounds.max_y - rounded.y, bounds.height(), dimensions.height, precision)?;
	AbsoluteTileCoordinate::new(zoom, x, y, TileOrigin::UpperLeft).with_origin(origin, dimensions)
}

/// The extent of a tile of a profile's global grid.
pub fn absolute_tile_bounds(profile: &dyn CrsProfile, tile: &AbsoluteTileCoordinate) -> Result<BoundingBox> {
	let dimensions = profile.tile_scheme().dimensions(tile.zoom)?;
	let upper_left = tile.with_origin(TileOrigin::UpperLeft, dimensions)?;
	let bounds = profile.bounds();
	let tile_width = bounds.width() / f64::from(dimensions.width);
	let tile_height = bounds.height() / f64::from(dimensions.height);
	let min_x = bounds.min_x + f64::from(upper_left.x) * tile_width;
	let max_y = bounds.max_y - f64::from(upper_left.y) * tile_height;
	BoundingBox::new(min_x, max_y - tile_height, min_x + tile_width, max_y)
}

/// The upper left corner of a tile of a profile's global grid.
pub fn absolute_to_crs(profile: &dyn CrsProfile, tile: &AbsoluteTileCoordinate) -> Result<CrsCoordinate> {
	let bounds = absolute_tile_bounds(profile, tile)?;
	Ok(CrsCoordinate::new(bounds.min_x, bounds.max_y, profile.crs()))
}

/// Maps a global grid tile onto the tile of `matrix` covering the same extent.
///
/// Only valid when the tile set is aligned with the profile's grid; a global tile that does
/// not coincide with a single tile of `matrix` is rejected.
#[context("mapping tile {} onto zoom level {} of '{}'", tile, matrix.zoom_level, matrix_set.table_name)]
pub fn absolute_to_relative(
	profile: &dyn CrsProfile,
	matrix_set: &TileMatrixSet,
	matrix: &TileMatrix,
	tile: &AbsoluteTileCoordinate,
) -> Result<RelativeTileCoordinate> {
	ensure_argument!(
		matrix_set.srs.crs() == profile.crs(),
		"tile set '{}' is in {}, not {}",
		matrix_set.table_name,
		matrix_set.srs.crs(),
		profile.crs()
	);
	let absolute = absolute_tile_bounds(profile, tile)?;
	let (cx, cy) = absolute.center();
	let converter = CoordinateConverter::new(matrix_set);
	let relative = converter.crs_to_relative(matrix, &CrsCoordinate::new(cx, cy, profile.crs()), profile.precision())?;
	ensure_aligned(&absolute, &converter.tile_bounds(matrix, relative)?, profile.precision())?;
	Ok(relative)
}

/// Maps a tile of `matrix` onto the global grid tile covering the same extent.
#[context("mapping tile {} of zoom level {} onto the grid of {}", tile, matrix.zoom_level, profile.crs())]
pub fn relative_to_absolute(
	profile: &dyn CrsProfile,
	matrix_set: &TileMatrixSet,
	matrix: &TileMatrix,
	tile: RelativeTileCoordinate,
	origin: TileOrigin,
) -> Result<AbsoluteTileCoordinate> {
	let converter = CoordinateConverter::new(matrix_set);
	let relative = converter.tile_bounds(matrix, tile)?;
	let zoom = profile_zoom_for(profile, relative.width(), relative.height())?;
	let (cx, cy) = relative.center();
	let absolute = crs_to_absolute(profile, &CrsCoordinate::new(cx, cy, profile.crs()), zoom, TileOrigin::UpperLeft)?;
	ensure_aligned(&absolute_tile_bounds(profile, &absolute)?, &relative, profile.precision())?;
	absolute.with_origin(origin, profile.tile_scheme().dimensions(zoom)?)
}

fn profile_zoom_for(profile: &dyn CrsProfile, tile_width: f64, tile_height: f64) -> Result<u32> {
	let bounds = profile.bounds();
	for zoom in 0..32 {
		let Ok(TileMatrixDimensions { width, height }) = profile.tile_scheme().dimensions(zoom) else {
			break;
		};
		let grid_width = bounds.width() / f64::from(width);
		let grid_height = bounds.height() / f64::from(height);
		if nearly_equal(grid_width, tile_width, profile.precision())
			&& nearly_equal(grid_height, tile_height, profile.precision())
		{
			return Ok(zoom);
		}
		if grid_width < tile_width {
			break;
		}
	}
	Err(invalid_argument!(
		"a tile size of {tile_width} x {tile_height} does not match any zoom level of {}",
		profile.crs()
	))
}

fn ensure_aligned(a: &BoundingBox, b: &BoundingBox, precision: u32) -> Result<()> {
	let aligned = a
		.as_array()
		.iter()
		.zip(b.as_array())
		.all(|(p, q)| nearly_equal(*p, q, precision));
	ensure_argument!(aligned, "tile bounds {a:?} and {b:?} are not aligned");
	Ok(())
}

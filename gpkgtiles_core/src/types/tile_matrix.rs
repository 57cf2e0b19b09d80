use crate::{BoundingBox, ensure_argument};
use anyhow::Result;

const PIXEL_SIZE_TOLERANCE: f64 = 1e-12;

/// Number of tile columns and rows in a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileMatrixDimensions {
	pub width: u32,
	pub height: u32,
}

impl TileMatrixDimensions {
	#[must_use]
	pub fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	#[must_use]
	pub fn count(&self) -> u64 {
		u64::from(self.width) * u64::from(self.height)
	}
}

/// One zoom level of a tile set (`gpkg_tile_matrix` row).
///
/// A matrix is an independent grid of `matrix_width x matrix_height` tiles covering the whole
/// tile matrix set bounding box. Neighbouring zoom levels need not differ by a factor of two.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMatrix {
	pub table_name: String,
	pub zoom_level: u32,
	pub matrix_width: u32,
	pub matrix_height: u32,
	pub tile_width: u32,
	pub tile_height: u32,
	pub pixel_x_size: f64,
	pub pixel_y_size: f64,
}

impl TileMatrix {
	pub fn new(
		table_name: &str,
		zoom_level: u32,
		matrix_width: u32,
		matrix_height: u32,
		tile_width: u32,
		tile_height: u32,
		pixel_x_size: f64,
		pixel_y_size: f64,
	) -> Result<TileMatrix> {
		ensure_argument!(matrix_width > 0, "matrix width must be greater than 0");
		ensure_argument!(matrix_height > 0, "matrix height must be greater than 0");
		ensure_argument!(tile_width > 0, "tile width must be greater than 0");
		ensure_argument!(tile_height > 0, "tile height must be greater than 0");
		ensure_argument!(
			pixel_x_size.is_finite() && pixel_x_size > 0.0,
			"pixel x size ({pixel_x_size}) must be a finite number greater than 0"
		);
		ensure_argument!(
			pixel_y_size.is_finite() && pixel_y_size > 0.0,
			"pixel y size ({pixel_y_size}) must be a finite number greater than 0"
		);
		Ok(TileMatrix {
			table_name: table_name.to_string(),
			zoom_level,
			matrix_width,
			matrix_height,
			tile_width,
			tile_height,
			pixel_x_size,
			pixel_y_size,
		})
	}

	/// Builds a matrix whose pixel sizes follow from the bounding box:
	/// `width / (matrix_width * tile_width)` and `height / (matrix_height * tile_height)`.
	pub fn with_derived_pixel_size(
		table_name: &str,
		zoom_level: u32,
		matrix_width: u32,
		matrix_height: u32,
		tile_width: u32,
		tile_height: u32,
		bounding_box: &BoundingBox,
	) -> Result<TileMatrix> {
		ensure_argument!(
			matrix_width > 0 && tile_width > 0 && matrix_height > 0 && tile_height > 0,
			"matrix and tile dimensions must be greater than 0"
		);
		let pixel_x_size = bounding_box.width() / (f64::from(matrix_width) * f64::from(tile_width));
		let pixel_y_size = bounding_box.height() / (f64::from(matrix_height) * f64::from(tile_height));
		TileMatrix::new(
			table_name,
			zoom_level,
			matrix_width,
			matrix_height,
			tile_width,
			tile_height,
			pixel_x_size,
			pixel_y_size,
		)
	}

	#[must_use]
	pub fn dimensions(&self) -> TileMatrixDimensions {
		TileMatrixDimensions::new(self.matrix_width, self.matrix_height)
	}

	/// Returns `true` if (column, row) is a valid index of this matrix.
	#[must_use]
	pub fn contains(&self, column: u32, row: u32) -> bool {
		column < self.matrix_width && row < self.matrix_height
	}

	/// Width and height of one tile in reference system units.
	#[must_use]
	pub fn tile_size(&self, bounding_box: &BoundingBox) -> (f64, f64) {
		(
			bounding_box.width() / f64::from(self.matrix_width),
			bounding_box.height() / f64::from(self.matrix_height),
		)
	}

	/// Equality with pixel sizes compared at a relative tolerance of `1e-12`.
	#[must_use]
	pub fn same_definition(&self, other: &TileMatrix) -> bool {
		self.table_name == other.table_name
			&& self.zoom_level == other.zoom_level
			&& self.matrix_width == other.matrix_width
			&& self.matrix_height == other.matrix_height
			&& self.tile_width == other.tile_width
			&& self.tile_height == other.tile_height
			&& nearly_equal(self.pixel_x_size, other.pixel_x_size)
			&& nearly_equal(self.pixel_y_size, other.pixel_y_size)
	}
}

fn nearly_equal(a: f64, b: f64) -> bool {
	(a - b).abs() <= PIXEL_SIZE_TOLERANCE * a.abs().max(b.abs())
}

use crate::{TileMatrixDimensions, ensure_argument};
use anyhow::Result;
use std::fmt::{self, Display};

/// The corner of a tile grid where (0, 0) sits.
///
/// The store always uses [`TileOrigin::UpperLeft`]. Producers that count rows from the bottom
/// (TMS style) are converted with [`TileOrigin::transform`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TileOrigin {
	#[default]
	UpperLeft,
	LowerLeft,
	UpperRight,
	LowerRight,
}

impl TileOrigin {
	fn is_upper(self) -> bool {
		matches!(self, TileOrigin::UpperLeft | TileOrigin::UpperRight)
	}

	fn is_left(self) -> bool {
		matches!(self, TileOrigin::UpperLeft | TileOrigin::LowerLeft)
	}

	/// Re-expresses (column, row) of a grid with this origin in a grid with origin `to`.
	///
	/// Flipping rows maps `row` to `height - 1 - row`, flipping columns likewise.
	pub fn transform(
		self,
		to: TileOrigin,
		column: u32,
		row: u32,
		dimensions: TileMatrixDimensions,
	) -> Result<(u32, u32)> {
		ensure_argument!(
			column < dimensions.width && row < dimensions.height,
			"tile ({column}, {row}) is outside of a {}x{} grid",
			dimensions.width,
			dimensions.height
		);
		let column = if self.is_left() == to.is_left() {
			column
		} else {
			dimensions.width - 1 - column
		};
		let row = if self.is_upper() == to.is_upper() {
			row
		} else {
			dimensions.height - 1 - row
		};
		Ok((column, row))
	}
}

/// A (column, row) index inside one tile matrix, counted from the upper left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RelativeTileCoordinate {
	pub column: u32,
	pub row: u32,
}

impl RelativeTileCoordinate {
	#[must_use]
	pub fn new(column: u32, row: u32) -> Self {
		Self { column, row }
	}
}

impl Display for RelativeTileCoordinate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.column, self.row)
	}
}

/// A tile index in the global grid of a reference system profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AbsoluteTileCoordinate {
	pub zoom: u32,
	pub x: u32,
	pub y: u32,
	pub origin: TileOrigin,
}

impl AbsoluteTileCoordinate {
	#[must_use]
	pub fn new(zoom: u32, x: u32, y: u32, origin: TileOrigin) -> Self {
		Self { zoom, x, y, origin }
	}

	/// Returns the same tile addressed from another origin.
	pub fn with_origin(&self, origin: TileOrigin, dimensions: TileMatrixDimensions) -> Result<Self> {
		let (x, y) = self.origin.transform(origin, self.x, self.y, dimensions)?;
		Ok(Self {
			zoom: self.zoom,
			x,
			y,
			origin,
		})
	}
}

impl Display for AbsoluteTileCoordinate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
	}
}

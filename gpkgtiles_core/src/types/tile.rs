use crate::TileData;

/// A stored tile: one row of a tile pyramid table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
	pub id: i64,
	pub zoom_level: u32,
	pub column: u32,
	pub row: u32,
	pub data: TileData,
}

/// Lifecycle of a tile set as seen from its rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileSetState {
	/// Registered without any tile matrix.
	Registered,
	/// At least one tile matrix, no tiles.
	Defined,
	/// At least one tile.
	Populated,
}

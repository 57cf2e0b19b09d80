use crate::{BoundingBox, Content, DataType, SpatialReferenceSystem, Timestamp, invalid_argument};
use anyhow::Result;

/// A registered raster tile pyramid: a `gpkg_contents` row with `data_type = 'tiles'`.
#[derive(Clone, Debug, PartialEq)]
pub struct TileSet {
	pub table_name: String,
	pub identifier: String,
	pub description: String,
	pub last_change: Timestamp,
	pub bounding_box: BoundingBox,
	pub srs_id: i32,
}

impl TileSet {
	/// Compares everything except `last_change`.
	#[must_use]
	pub fn same_payload(&self, other: &TileSet) -> bool {
		self.table_name == other.table_name
			&& self.identifier == other.identifier
			&& self.description == other.description
			&& self.bounding_box == other.bounding_box
			&& self.srs_id == other.srs_id
	}
}

impl TryFrom<Content> for TileSet {
	type Error = anyhow::Error;

	fn try_from(content: Content) -> Result<Self> {
		if content.data_type != DataType::Tiles {
			return Err(invalid_argument!(
				"content '{}' has data type '{}', not 'tiles'",
				content.table_name,
				content.data_type
			));
		}
		let bounding_box = content
			.bounding_box
			.ok_or_else(|| invalid_argument!("tile set '{}' has no bounding box", content.table_name))?;
		let srs_id = content
			.srs_id
			.ok_or_else(|| invalid_argument!("tile set '{}' has no reference system", content.table_name))?;
		Ok(TileSet {
			identifier: content.identifier.unwrap_or_else(|| content.table_name.clone()),
			description: content.description.unwrap_or_default(),
			table_name: content.table_name,
			last_change: content.last_change,
			bounding_box,
			srs_id,
		})
	}
}

/// The grid definition shared by all tile matrices of one tile set (`gpkg_tile_matrix_set`).
#[derive(Clone, Debug, PartialEq)]
pub struct TileMatrixSet {
	pub table_name: String,
	pub srs: SpatialReferenceSystem,
	pub bounding_box: BoundingBox,
}

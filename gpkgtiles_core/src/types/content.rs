use crate::{BoundingBox, Timestamp};
use std::fmt::{self, Display};

/// Value of `gpkg_contents.data_type`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
	Tiles,
	Features,
	Attributes,
	Other(String),
}

impl DataType {
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			DataType::Tiles => "tiles",
			DataType::Features => "features",
			DataType::Attributes => "attributes",
			DataType::Other(name) => name,
		}
	}
}

impl From<&str> for DataType {
	fn from(value: &str) -> Self {
		match value {
			"tiles" => DataType::Tiles,
			"features" => DataType::Features,
			"attributes" => DataType::Attributes,
			other => DataType::Other(other.to_string()),
		}
	}
}

impl Display for DataType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A row of the content registry (`gpkg_contents`).
#[derive(Clone, Debug, PartialEq)]
pub struct Content {
	pub table_name: String,
	pub data_type: DataType,
	pub identifier: Option<String>,
	pub description: Option<String>,
	pub last_change: Timestamp,
	pub bounding_box: Option<BoundingBox>,
	pub srs_id: Option<i32>,
}

impl Content {
	/// Compares everything except `last_change`.
	#[must_use]
	pub fn same_payload(&self, other: &Content) -> bool {
		self.table_name == other.table_name
			&& self.data_type == other.data_type
			&& self.identifier == other.identifier
			&& self.description == other.description
			&& self.bounding_box == other.bounding_box
			&& self.srs_id == other.srs_id
	}
}

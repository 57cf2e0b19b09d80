//! YAML description of a tile pyramid layout.
//!
//! ```yaml
//! reference_systems:
//!   - name: WGS 84 / Pseudo-Mercator
//!     srs_id: 3857
//!     organization: EPSG
//!     organization_coordsys_id: 3857
//!     definition: PROJCS["WGS 84 / Pseudo-Mercator", ...]
//!
//! tile_sets:
//!   - table_name: ortho
//!     identifier: Orthophotos
//!     description: aerial images 2024
//!     srs_id: 3857
//!     bbox: [1491000, 6880000, 1520000, 6910000]
//!     tile_matrices:
//!       - { zoom_level: 0, matrix_width: 1, matrix_height: 1 }
//!       - { zoom_level: 1, matrix_width: 3, matrix_height: 3, tile_width: 512, tile_height: 512 }
//! ```
//!
//! A tile set without `bbox` covers the bounds of its reference system's profile, and
//! `profile_zoom_levels: [min, max]` adds one matrix per zoom level laid out like the
//! profile's global grid.

use anyhow::Result;
use gpkgtiles_container::GeoPackage;
use gpkgtiles_core::{BoundingBox, TileSet, bail_argument, crs_profile_for, invalid_argument};
use gpkgtiles_derive::context;
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

const DEFAULT_TILE_SIZE: u32 = 256;

fn default_tile_size() -> u32 {
	DEFAULT_TILE_SIZE
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PyramidConfig {
	/// Reference systems to register before the tile sets
	#[serde(default)]
	pub reference_systems: Vec<ReferenceSystemConfig>,

	/// Tile sets to create
	#[serde(default)]
	pub tile_sets: Vec<TileSetConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReferenceSystemConfig {
	pub name: String,
	pub srs_id: i32,
	pub organization: String,
	pub organization_coordsys_id: i32,
	pub definition: String,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TileSetConfig {
	pub table_name: String,

	/// Human readable name, defaults to `table_name`
	#[serde(default)]
	pub identifier: Option<String>,

	#[serde(default)]
	pub description: String,

	pub srs_id: i32,

	/// `[min_x, min_y, max_x, max_y]`, defaults to the profile bounds of the reference system
	#[serde(default)]
	pub bbox: Option<[f64; 4]>,

	#[serde(default)]
	pub tile_matrices: Vec<TileMatrixConfig>,

	/// `[min, max]` zoom levels laid out like the global grid of the reference system
	#[serde(default)]
	pub profile_zoom_levels: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TileMatrixConfig {
	pub zoom_level: u32,
	pub matrix_width: u32,
	pub matrix_height: u32,
	#[serde(default = "default_tile_size")]
	pub tile_width: u32,
	#[serde(default = "default_tile_size")]
	pub tile_height: u32,
	/// Derived from the bounding box when omitted
	#[serde(default)]
	pub pixel_x_size: Option<f64>,
	#[serde(default)]
	pub pixel_y_size: Option<f64>,
}

impl TileMatrixConfig {
	fn pixel_size(&self) -> Result<Option<(f64, f64)>> {
		match (self.pixel_x_size, self.pixel_y_size) {
			(Some(x), Some(y)) => Ok(Some((x, y))),
			(None, None) => Ok(None),
			_ => Err(invalid_argument!(
				"zoom level {}: pixel_x_size and pixel_y_size must be given together",
				self.zoom_level
			)),
		}
	}
}

impl PyramidConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	#[context("reading pyramid config '{}'", path.display())]
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path)?;
		PyramidConfig::from_reader(BufReader::new(file))
	}

	/// Registers everything described here. Entries that already exist with identical
	/// values are kept, so applying a config twice is harmless.
	pub fn apply(&self, gpkg: &GeoPackage) -> Result<Vec<TileSet>> {
		let core = gpkg.core();
		for srs in &self.reference_systems {
			core.add_spatial_reference_system(
				&srs.name,
				srs.srs_id,
				&srs.organization,
				srs.organization_coordsys_id,
				&srs.definition,
				srs.description.as_deref(),
			)?;
		}
		self
			.tile_sets
			.iter()
			.map(|tile_set| tile_set.apply(gpkg))
			.collect()
	}
}

impl TileSetConfig {
	#[context("creating tile set '{}'", self.table_name)]
	fn apply(&self, gpkg: &GeoPackage) -> Result<TileSet> {
		let Some(srs) = gpkg.core().get_spatial_reference_system(self.srs_id)? else {
			bail_argument!("srs_id {} is not registered", self.srs_id);
		};
		let bbox = match self.bbox {
			Some(values) => BoundingBox::try_from(values)?,
			None => crs_profile_for(&srs.crs())?.bounds(),
		};

		let tiles = gpkg.tiles();
		let tile_set = tiles.add_tile_set(
			&self.table_name,
			self.identifier.as_deref().unwrap_or(&self.table_name),
			&self.description,
			&bbox,
			&srs,
		)?;
		let matrix_set = tiles.get_tile_matrix_set(&tile_set)?;

		if let Some((min, max)) = self.profile_zoom_levels {
			let scheme = crs_profile_for(&srs.crs())?.tile_scheme();
			for zoom_level in min..=max {
				let dimensions = scheme.dimensions(zoom_level)?;
				tiles.add_tile_matrix(
					&matrix_set,
					zoom_level,
					dimensions.width,
					dimensions.height,
					DEFAULT_TILE_SIZE,
					DEFAULT_TILE_SIZE,
					None,
				)?;
			}
		}

		for matrix in &self.tile_matrices {
			tiles.add_tile_matrix(
				&matrix_set,
				matrix.zoom_level,
				matrix.matrix_width,
				matrix.matrix_height,
				matrix.tile_width,
				matrix.tile_height,
				matrix.pixel_size()?,
			)?;
		}
		log::debug!("tile set '{}' has zoom levels {:?}", tile_set.table_name, tiles.get_zoom_levels(&tile_set)?);
		Ok(tile_set)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::NamedTempFile;
	use gpkgtiles_core::ErrorKind;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_example_config() {
		let cfg = PyramidConfig::from_path(Path::new("../testdata/pyramid.yml")).unwrap();
		assert_eq!(cfg.reference_systems.len(), 1);
		assert_eq!(cfg.reference_systems[0].srs_id, 3857);
		assert_eq!(cfg.tile_sets.len(), 2);

		let ortho = &cfg.tile_sets[0];
		assert_eq!(ortho.table_name, "ortho");
		assert_eq!(ortho.bbox, Some([1491000.0, 6880000.0, 1520000.0, 6910000.0]));
		assert_eq!(
			ortho.tile_matrices[1],
			TileMatrixConfig {
				zoom_level: 1,
				matrix_width: 3,
				matrix_height: 3,
				tile_width: 512,
				tile_height: 512,
				pixel_x_size: None,
				pixel_y_size: None,
			}
		);
		assert_eq!(cfg.tile_sets[1].profile_zoom_levels, Some((0, 3)));
	}

	#[test]
	fn parse_empty_config() {
		assert_eq!(PyramidConfig::from_string("").unwrap(), PyramidConfig::default());
	}

	#[test]
	fn parse_invalid_config() {
		assert!(PyramidConfig::from_string("tile_set:\n  - table_name: x").is_err());
		assert!(PyramidConfig::from_string("tile_sets:\n  - table_name: x").is_err());
	}

	#[test]
	fn apply_example_config() {
		let file = NamedTempFile::new("pyramid.gpkg").unwrap();
		let gpkg = GeoPackage::create(file.path()).unwrap();
		let cfg = PyramidConfig::from_path(Path::new("../testdata/pyramid.yml")).unwrap();
		let tile_sets = cfg.apply(&gpkg).unwrap();
		assert_eq!(tile_sets.len(), 2);

		let tiles = gpkg.tiles();
		let ortho = &tile_sets[0];
		assert_eq!(ortho.identifier, "Orthophotos");
		assert_eq!(ortho.srs_id, 3857);
		let matrices = tiles.get_tile_matrices(ortho).unwrap();
		assert_eq!(matrices.len(), 2);
		assert_eq!(matrices[1].pixel_x_size, 29000.0 / 1536.0);

		let world = &tile_sets[1];
		assert_eq!(world.identifier, "world");
		assert_eq!(world.bounding_box, BoundingBox::new(-180.0, -90.0, 180.0, 90.0).unwrap());
		let widths = tiles
			.get_tile_matrices(world)
			.unwrap()
			.into_iter()
			.map(|matrix| (matrix.matrix_width, matrix.matrix_height))
			.collect::<Vec<_>>();
		assert_eq!(widths, [(2, 1), (4, 2), (8, 4), (16, 8)]);

		// applying the same config again changes nothing
		assert_eq!(cfg.apply(&gpkg).unwrap(), tile_sets);
		assert!(gpkg.verify().unwrap().is_empty());
	}

	#[test]
	fn unknown_srs_id() {
		let file = NamedTempFile::new("unknown.gpkg").unwrap();
		let gpkg = GeoPackage::create(file.path()).unwrap();
		let cfg = PyramidConfig::from_string("tile_sets:\n  - table_name: x\n    srs_id: 900913").unwrap();
		let err = cfg.apply(&gpkg).unwrap_err();
		assert_eq!(ErrorKind::of(&err), ErrorKind::InvalidArgument);
	}

	#[test]
	fn pixel_sizes_come_in_pairs() {
		let matrix = TileMatrixConfig {
			zoom_level: 0,
			matrix_width: 1,
			matrix_height: 1,
			tile_width: 256,
			tile_height: 256,
			pixel_x_size: Some(1.0),
			pixel_y_size: None,
		};
		assert!(matrix.pixel_size().is_err());
	}
}

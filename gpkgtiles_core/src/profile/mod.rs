//! Reference system profiles.
//!
//! A profile answers the questions the tile store cannot answer from the database alone:
//! the valid extent of a reference system, the number of decimal places that are meaningful,
//! how the global tile grid is laid out per zoom level, and how to get to and from WGS 84
//! geographic coordinates.

mod global_geodetic;
pub use global_geodetic::*;

mod spherical_mercator;
pub use spherical_mercator::*;

use crate::{
	BoundingBox, CoordinateReferenceSystem, CrsCoordinate, SpatialReferenceSystem, TileMatrixDimensions,
	ensure_argument, invalid_argument,
};
use anyhow::Result;
use std::fmt::Debug;

/// Layout of a global quadtree: `base` tiles at zoom 0, doubling on both axes per level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileScheme {
	base: TileMatrixDimensions,
}

impl TileScheme {
	/// The scheme with `base_width x base_height` tiles at zoom level 0.
	#[must_use]
	pub const fn zoom_times_two(base_width: u32, base_height: u32) -> Self {
		Self {
			base: TileMatrixDimensions {
				width: base_width,
				height: base_height,
			},
		}
	}

	/// Grid size at `zoom`. Fails if the size does not fit into `u32`.
	pub fn dimensions(&self, zoom: u32) -> Result<TileMatrixDimensions> {
		let factor = 1u32
			.checked_shl(zoom)
			.ok_or_else(|| invalid_argument!("zoom level {zoom} is too large"))?;
		let width = self
			.base
			.width
			.checked_mul(factor)
			.ok_or_else(|| invalid_argument!("zoom level {zoom} is too large"))?;
		let height = self
			.base
			.height
			.checked_mul(factor)
			.ok_or_else(|| invalid_argument!("zoom level {zoom} is too large"))?;
		Ok(TileMatrixDimensions::new(width, height))
	}
}

/// Everything the store needs to know about a reference system.
pub trait CrsProfile: Debug {
	fn crs(&self) -> CoordinateReferenceSystem;

	/// Human readable name, used as `srs_name` when registering the system.
	fn name(&self) -> &'static str;

	/// Valid extent in the system's own units.
	fn bounds(&self) -> BoundingBox;

	/// Number of meaningful decimal places of a coordinate.
	fn precision(&self) -> u32;

	fn tile_scheme(&self) -> TileScheme;

	fn well_known_text(&self) -> &'static str;

	/// Converts a coordinate of this system into WGS 84 longitude/latitude.
	fn to_global_geodetic(&self, coordinate: &CrsCoordinate) -> Result<CrsCoordinate>;

	/// Converts WGS 84 longitude/latitude into this system.
	fn from_global_geodetic(&self, coordinate: &CrsCoordinate) -> Result<CrsCoordinate>;

	/// The registry row describing this system, using the EPSG code as `srs_id`.
	fn spatial_reference_system(&self) -> Result<SpatialReferenceSystem> {
		let crs = self.crs();
		SpatialReferenceSystem::new(
			self.name(),
			crs.identifier(),
			crs.authority(),
			crs.identifier(),
			self.well_known_text(),
			None,
		)
	}
}

/// Fails unless `coordinate` is expressed in `crs`.
pub(crate) fn ensure_crs(coordinate: &CrsCoordinate, crs: &CoordinateReferenceSystem) -> Result<()> {
	ensure_argument!(
		&coordinate.crs == crs,
		"coordinate is in {} but {} was expected",
		coordinate.crs,
		crs
	);
	Ok(())
}

/// Returns the profile for a known reference system.
///
/// ```
/// use gpkgtiles_core::{CoordinateReferenceSystem, crs_profile_for};
///
/// let profile = crs_profile_for(&CoordinateReferenceSystem::epsg(3857)).unwrap();
/// assert_eq!(profile.precision(), 2);
/// assert!(crs_profile_for(&CoordinateReferenceSystem::epsg(32633)).is_err());
/// ```
pub fn crs_profile_for(crs: &CoordinateReferenceSystem) -> Result<Box<dyn CrsProfile>> {
	if crs == &GlobalGeodeticCrsProfile.crs() {
		Ok(Box::new(GlobalGeodeticCrsProfile))
	} else if crs == &SphericalMercatorCrsProfile.crs() {
		Ok(Box::new(SphericalMercatorCrsProfile))
	} else {
		Err(invalid_argument!("no profile is available for reference system {crs}"))
	}
}

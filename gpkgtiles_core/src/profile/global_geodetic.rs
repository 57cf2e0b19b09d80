use super::{CrsProfile, TileScheme, ensure_crs};
use crate::{BoundingBox, CoordinateReferenceSystem, CrsCoordinate, ensure_argument};
use anyhow::Result;

pub(crate) const WGS84_WKT: &str = concat!(
	"GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563,",
	"AUTHORITY[\"EPSG\",\"7030\"]],AUTHORITY[\"EPSG\",\"6326\"]],PRIMEM[\"Greenwich\",0,",
	"AUTHORITY[\"EPSG\",\"8901\"]],UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],",
	"AUTHORITY[\"EPSG\",\"4326\"]]"
);

/// WGS 84 longitude/latitude (EPSG:4326) with a 2x1 tile grid at zoom 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalGeodeticCrsProfile;

impl CrsProfile for GlobalGeodeticCrsProfile {
	fn crs(&self) -> CoordinateReferenceSystem {
		CoordinateReferenceSystem::epsg(4326)
	}

	fn name(&self) -> &'static str {
		"WGS 84 geodetic"
	}

	fn bounds(&self) -> BoundingBox {
		BoundingBox {
			min_x: -180.0,
			min_y: -90.0,
			max_x: 180.0,
			max_y: 90.0,
		}
	}

	fn precision(&self) -> u32 {
		7
	}

	fn tile_scheme(&self) -> TileScheme {
		TileScheme::zoom_times_two(2, 1)
	}

	fn well_known_text(&self) -> &'static str {
		WGS84_WKT
	}

	fn to_global_geodetic(&self, coordinate: &CrsCoordinate) -> Result<CrsCoordinate> {
		ensure_crs(coordinate, &self.crs())?;
		ensure_argument!(
			self.bounds().contains(coordinate.x, coordinate.y),
			"coordinate {coordinate} is outside of the valid longitude/latitude range"
		);
		Ok(coordinate.clone())
	}

	fn from_global_geodetic(&self, coordinate: &CrsCoordinate) -> Result<CrsCoordinate> {
		self.to_global_geodetic(coordinate)
	}
}

use super::{CrsProfile, TileScheme, ensure_crs};
use crate::{BoundingBox, CoordinateReferenceSystem, CrsCoordinate, ensure_argument};
use anyhow::Result;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Radius of the sphere used by Web Mercator (WGS 84 semi-major axis).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the Web Mercator square ends.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.05112877980659;

const HALF_WORLD: f64 = PI * EARTH_RADIUS;

const PSEUDO_MERCATOR_WKT: &str = concat!(
	"PROJCS[\"WGS 84 / Pseudo-Mercator\",GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",",
	"SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],AUTHORITY[\"EPSG\",\"6326\"]],",
	"PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],UNIT[\"degree\",0.0174532925199433,",
	"AUTHORITY[\"EPSG\",\"9122\"]],AUTHORITY[\"EPSG\",\"4326\"]],PROJECTION[\"Mercator_1SP\"],",
	"PARAMETER[\"central_meridian\",0],PARAMETER[\"scale_factor\",1],PARAMETER[\"false_easting\",0],",
	"PARAMETER[\"false_northing\",0],UNIT[\"metre\",1,AUTHORITY[\"EPSG\",\"9001\"]],AXIS[\"X\",EAST],",
	"AXIS[\"Y\",NORTH],AUTHORITY[\"EPSG\",\"3857\"]]"
);

/// Spherical ("web") Mercator in metres (EPSG:3857) with a single tile at zoom 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct SphericalMercatorCrsProfile;

impl CrsProfile for SphericalMercatorCrsProfile {
	fn crs(&self) -> CoordinateReferenceSystem {
		CoordinateReferenceSystem::epsg(3857)
	}

	fn name(&self) -> &'static str {
		"WGS 84 / Pseudo-Mercator"
	}

	fn bounds(&self) -> BoundingBox {
		BoundingBox {
			min_x: -HALF_WORLD,
			min_y: -HALF_WORLD,
			max_x: HALF_WORLD,
			max_y: HALF_WORLD,
		}
	}

	fn precision(&self) -> u32 {
		2
	}

	fn tile_scheme(&self) -> TileScheme {
		TileScheme::zoom_times_two(1, 1)
	}

	fn well_known_text(&self) -> &'static str {
		PSEUDO_MERCATOR_WKT
	}

	fn to_global_geodetic(&self, coordinate: &CrsCoordinate) -> Result<CrsCoordinate> {
		ensure_crs(coordinate, &self.crs())?;
		ensure_argument!(
			coordinate.x.is_finite() && coordinate.y.is_finite(),
			"coordinate {coordinate} is not finite"
		);
		let lon = (coordinate.x / EARTH_RADIUS).to_degrees();
		let lat = (2.0 * (coordinate.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2).to_degrees();
		Ok(CrsCoordinate::new(lon, lat, CoordinateReferenceSystem::epsg(4326)))
	}

	/// Latitudes beyond ±85.0511° are clamped to the edge of the Mercator square.
	fn from_global_geodetic(&self, coordinate: &CrsCoordinate) -> Result<CrsCoordinate> {
		ensure_crs(coordinate, &CoordinateReferenceSystem::epsg(4326))?;
		ensure_argument!(
			(-180.0..=180.0).contains(&coordinate.x) && (-90.0..=90.0).contains(&coordinate.y),
			"coordinate {coordinate} is outside of the valid longitude/latitude range"
		);
		let lat = coordinate.y.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
		let x = EARTH_RADIUS * coordinate.x.to_radians();
		let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
		Ok(CrsCoordinate::new(x, y, self.crs()))
	}
}

use crate::CoordinateReferenceSystem;
use std::fmt::{self, Display};

/// A point in the units of a specific coordinate reference system.
#[derive(Clone, Debug, PartialEq)]
pub struct CrsCoordinate {
	pub x: f64,
	pub y: f64,
	pub crs: CoordinateReferenceSystem,
}

impl CrsCoordinate {
	#[must_use]
	pub fn new(x: f64, y: f64, crs: CoordinateReferenceSystem) -> Self {
		Self { x, y, crs }
	}

	/// Rounds both axes to `precision` decimal places.
	///
	/// Used before containment tests so that values produced by floating point arithmetic
	/// just outside a bounding box edge still resolve to the edge.
	#[must_use]
	pub fn rounded(&self, precision: u32) -> CrsCoordinate {
		let factor = 10f64.powi(precision.min(15) as i32);
		CrsCoordinate {
			x: (self.x * factor).round() / factor,
			y: (self.y * factor).round() / factor,
			crs: self.crs.clone(),
		}
	}
}

impl Display for CrsCoordinate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {}) {}", self.x, self.y, self.crs)
	}
}

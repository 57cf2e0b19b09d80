use crate::{ensure_argument, invalid_argument};
use anyhow::Result;
use std::fmt::{self, Debug};

/// An axis-aligned rectangle in the units of some reference system.
///
/// All four values are finite and `min <= max` on both axes. Unlike a geographic box, the
/// values are not limited to degrees: projected systems use metres.
///
/// ```
/// use gpkgtiles_core::BoundingBox;
///
/// let bbox = BoundingBox::new(0.0, 0.0, 30.0, 50.0).unwrap();
/// assert_eq!(bbox.width(), 30.0);
/// assert_eq!(bbox.height(), 50.0);
/// assert!(bbox.contains(30.0, 0.0));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct BoundingBox {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl BoundingBox {
	/// Creates a bounding box from `min_x, min_y, max_x, max_y`.
	///
	/// # Errors
	/// Fails with an invalid-argument error if a value is NaN or infinite, or if a minimum
	/// exceeds its maximum.
	pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<BoundingBox> {
		BoundingBox {
			min_x,
			min_y,
			max_x,
			max_y,
		}
		.checked()
	}

	/// Builds a bounding box from nullable columns.
	///
	/// Returns `Ok(None)` when all four values are absent. A partially present box is rejected.
	pub fn from_options(
		min_x: Option<f64>,
		min_y: Option<f64>,
		max_x: Option<f64>,
		max_y: Option<f64>,
	) -> Result<Option<BoundingBox>> {
		match (min_x, min_y, max_x, max_y) {
			(Some(min_x), Some(min_y), Some(max_x), Some(max_y)) => Ok(Some(BoundingBox::new(min_x, min_y, max_x, max_y)?)),
			(None, None, None, None) => Ok(None),
			_ => Err(invalid_argument!(
				"bounding box must have all four values or none: {min_x:?}, {min_y:?}, {max_x:?}, {max_y:?}"
			)),
		}
	}

	fn checked(self) -> Result<Self> {
		for (name, value) in [
			("min_x", self.min_x),
			("min_y", self.min_y),
			("max_x", self.max_x),
			("max_y", self.max_y),
		] {
			ensure_argument!(value.is_finite(), "{name} ({value}) must be a finite number");
		}
		ensure_argument!(
			self.min_x <= self.max_x,
			"min_x ({}) must be <= max_x ({})",
			self.min_x,
			self.max_x
		);
		ensure_argument!(
			self.min_y <= self.max_y,
			"min_y ({}) must be <= max_y ({})",
			self.min_y,
			self.max_y
		);
		Ok(self)
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Returns `true` if neither dimension is zero.
	#[must_use]
	pub fn has_area(&self) -> bool {
		self.width() > 0.0 && self.height() > 0.0
	}

	/// Inclusive containment test: points on the edges are inside.
	#[must_use]
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
	}

	/// Returns `true` if `other` lies completely inside `self`.
	#[must_use]
	pub fn contains_bbox(&self, other: &BoundingBox) -> bool {
		self.contains(other.min_x, other.min_y) && self.contains(other.max_x, other.max_y)
	}

	#[must_use]
	pub fn center(&self) -> (f64, f64) {
		(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.min_x, self.min_y, self.max_x, self.max_y]
	}

	/// Returns the box as `min_x,min_y,max_x,max_y`.
	#[must_use]
	pub fn as_string_list(&self) -> String {
		format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
	}
}

impl Debug for BoundingBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"BoundingBox({}, {}, {}, {})",
			self.min_x, self.min_y, self.max_x, self.max_y
		)
	}
}

impl TryFrom<[f64; 4]> for BoundingBox {
	type Error = anyhow::Error;

	fn try_from(input: [f64; 4]) -> Result<Self> {
		BoundingBox::new(input[0], input[1], input[2], input[3])
	}
}

impl TryFrom<&[f64]> for BoundingBox {
	type Error = anyhow::Error;

	fn try_from(input: &[f64]) -> Result<Self> {
		ensure_argument!(
			input.len() == 4,
			"bounding box must have 4 values (min_x, min_y, max_x, max_y), got {}",
			input.len()
		);
		BoundingBox::new(input[0], input[1], input[2], input[3])
	}
}

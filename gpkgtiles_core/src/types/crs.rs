use crate::{ensure_argument, invalid_argument};
use anyhow::Result;
use std::{
	fmt::{self, Display},
	str::FromStr,
};

/// Identity of a coordinate reference system: an authority name plus a numeric code,
/// for example `EPSG:3857`.
///
/// The authority is stored upper case, so `epsg:4326` and `EPSG:4326` are the same system.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordinateReferenceSystem {
	authority: String,
	identifier: i32,
}

impl CoordinateReferenceSystem {
	pub fn new(authority: &str, identifier: i32) -> Result<Self> {
		let authority = authority.trim();
		ensure_argument!(!authority.is_empty(), "authority must not be empty");
		Ok(Self {
			authority: authority.to_uppercase(),
			identifier,
		})
	}

	#[must_use]
	pub fn epsg(identifier: i32) -> Self {
		Self {
			authority: String::from("EPSG"),
			identifier,
		}
	}

	#[must_use]
	pub fn authority(&self) -> &str {
		&self.authority
	}

	#[must_use]
	pub fn identifier(&self) -> i32 {
		self.identifier
	}
}

impl Display for CoordinateReferenceSystem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.authority, self.identifier)
	}
}

impl FromStr for CoordinateReferenceSystem {
	type Err = anyhow::Error;

	/// Parses `AUTHORITY:CODE`, e.g. `EPSG:4326`.
	fn from_str(text: &str) -> Result<Self> {
		let (authority, identifier) = text
			.split_once(':')
			.ok_or_else(|| invalid_argument!("reference system '{text}' must have the form AUTHORITY:CODE"))?;
		let identifier = identifier
			.trim()
			.parse::<i32>()
			.map_err(|_| invalid_argument!("reference system code in '{text}' must be an integer"))?;
		Self::new(authority, identifier)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn authority_is_case_insensitive() {
		let a = CoordinateReferenceSystem::new("epsg", 4326).unwrap();
		assert_eq!(a, CoordinateReferenceSystem::epsg(4326));
		assert_eq!(a.to_string(), "EPSG:4326");
		assert_eq!(a.authority(), "EPSG");
		assert_eq!(a.identifier(), 4326);
	}

	#[rstest]
	#[case("EPSG:3857", "EPSG", 3857)]
	#[case("epsg:4326", "EPSG", 4326)]
	#[case("NONE:-1", "NONE", -1)]
	fn parse_valid(#[case] text: &str, #[case] authority: &str, #[case] identifier: i32) {
		let crs: CoordinateReferenceSystem = text.parse().unwrap();
		assert_eq!(crs.authority(), authority);
		assert_eq!(crs.identifier(), identifier);
	}

	#[rstest]
	#[case("EPSG")]
	#[case("EPSG:abc")]
	#[case(":4326")]
	fn parse_invalid(#[case] text: &str) {
		assert!(text.parse::<CoordinateReferenceSystem>().is_err());
	}
}

//! Validation and quoting of SQL identifiers.
//!
//! Table names chosen at runtime end up in statement text, so they are either validated
//! against a strict allow-list ([`Identifier`]) or, for names read back from an existing
//! file, escaped with [`quote_identifier`]. Values are always bound as parameters.

use crate::{ensure_argument, invalid_argument};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{self, Display};

/// Prefix reserved for the GeoPackage catalog tables.
pub const RESERVED_PREFIX: &str = "gpkg_";

const MAX_LENGTH: usize = 128;

lazy_static! {
	static ref RE_IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// A table name that is safe to interpolate into SQL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
	/// Validates a user supplied table name.
	///
	/// The name must be non-empty, match `^[A-Za-z_][A-Za-z0-9_]*$`, be at most 128 characters
	/// long and must not start with the reserved prefix `gpkg_` (case-insensitive).
	pub fn new(name: &str) -> Result<Identifier> {
		ensure_argument!(!name.is_empty(), "table name must not be empty");
		ensure_argument!(
			name.len() <= MAX_LENGTH,
			"table name '{name}' is longer than {MAX_LENGTH} characters"
		);
		if !RE_IDENTIFIER.is_match(name) {
			return Err(invalid_argument!(
				"table name '{name}' must start with a letter or underscore and contain only letters, digits and underscores"
			));
		}
		ensure_argument!(
			!name.to_ascii_lowercase().starts_with(RESERVED_PREFIX),
			"table name '{name}' must not start with the reserved prefix '{RESERVED_PREFIX}'"
		);
		Ok(Identifier(name.to_string()))
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The name wrapped in double quotes, ready for statement text.
	#[must_use]
	pub fn quoted(&self) -> String {
		quote_identifier(&self.0)
	}
}

impl Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Quotes an arbitrary name for use as an SQL identifier, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
	format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ErrorKind;
	use rstest::rstest;

	#[rstest]
	#[case("tiles")]
	#[case("_private")]
	#[case("Ortho_2024")]
	#[case("gpkgtiles")]
	fn valid_names(#[case] name: &str) {
		let identifier = Identifier::new(name).unwrap();
		assert_eq!(identifier.as_str(), name);
		assert_eq!(identifier.quoted(), format!("\"{name}\""));
	}

	#[rstest]
	#[case("")]
	#[case("1tiles")]
	#[case("tiles; DROP TABLE gpkg_contents")]
	#[case("tiles\"")]
	#[case("tile-set")]
	#[case("gpkg_tiles")]
	#[case("GPKG_Tiles")]
	fn invalid_names(#[case] name: &str) {
		let err = Identifier::new(name).unwrap_err();
		assert_eq!(ErrorKind::of(&err), ErrorKind::InvalidArgument);
	}

	#[test]
	fn too_long() {
		assert!(Identifier::new(&"a".repeat(128)).is_ok());
		assert!(Identifier::new(&"a".repeat(129)).is_err());
	}

	#[test]
	fn quoting_escapes_quotes() {
		assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
		assert_eq!(quote_identifier("gpkg_contents"), "\"gpkg_contents\"");
	}
}

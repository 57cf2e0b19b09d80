//! Macros for raising classified errors, plus a wildcard assertion for tests.

/// Builds an [`anyhow::Error`] whose root cause is [`GpkgError::InvalidArgument`](crate::GpkgError).
///
/// ```
/// use gpkgtiles_core::{ErrorKind, invalid_argument};
///
/// let err = invalid_argument!("zoom level {} has no tile matrix", 3);
/// assert_eq!(ErrorKind::of(&err), ErrorKind::InvalidArgument);
/// assert_eq!(err.to_string(), "invalid argument: zoom level 3 has no tile matrix");
/// ```
#[macro_export]
macro_rules! invalid_argument {
	($($arg:tt)*) => {
		::anyhow::Error::new($crate::GpkgError::InvalidArgument(format!($($arg)*)))
	};
}

/// Returns early with an invalid-argument error if the condition does not hold.
///
/// Works like [`anyhow::ensure!`] but the error can be classified with [`ErrorKind::of`](crate::ErrorKind::of).
#[macro_export]
macro_rules! ensure_argument {
	($cond:expr, $($arg:tt)*) => {
		if !($cond) {
			return Err($crate::invalid_argument!($($arg)*).into());
		}
	};
}

/// Returns early with an invalid-argument error.
#[macro_export]
macro_rules! bail_argument {
	($($arg:tt)*) => {
		return Err($crate::invalid_argument!($($arg)*).into())
	};
}

/// Asserts that the `Display` output of an expression matches a wildcard pattern.
///
/// Useful for error messages that contain file paths or timestamps.
///
/// ```ignore
/// use gpkgtiles_core::assert_wildcard;
/// assert_wildcard!("opening '/tmp/x1.gpkg'", "opening '*.gpkg'");
/// ```
#[cfg(any(test, feature = "test"))]
#[macro_export]
macro_rules! assert_wildcard {
	($expression:expr, $wildcard:expr) => {
		let expression = format!("{}", $expression);
		if !$crate::__wildmatch::WildMatch::new($wildcard).matches(&expression) {
			panic!(
				"assertion failed: expression {expression:?} does not match wildcard {:?}",
				$wildcard
			)
		}
	};
}

use gpkgtiles_core::ErrorKind;
use r2d2_sqlite::rusqlite::{self, ffi};

/// Returns `true` for a violated UNIQUE or PRIMARY KEY constraint.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
	matches!(
		err,
		rusqlite::Error::SqliteFailure(e, _)
			if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
	)
}

/// Classifies an error like [`ErrorKind::of`], additionally recognising storage engine
/// errors as [`ErrorKind::Storage`].
///
/// ```
/// use gpkgtiles_container::classify_error;
/// use gpkgtiles_core::{ErrorKind, invalid_argument};
///
/// assert_eq!(classify_error(&invalid_argument!("bad")), ErrorKind::InvalidArgument);
/// ```
pub fn classify_error(err: &anyhow::Error) -> ErrorKind {
	match ErrorKind::of(err) {
		ErrorKind::Other => {
			if err.chain().any(|cause| cause.is::<rusqlite::Error>() || cause.is::<r2d2::Error>()) {
				ErrorKind::Storage
			} else {
				ErrorKind::Other
			}
		}
		kind => kind,
	}
}

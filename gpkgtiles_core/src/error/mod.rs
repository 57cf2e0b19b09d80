//! Error taxonomy.
//!
//! All fallible functions in the gpkgtiles crates return [`anyhow::Result`]. Errors that a caller
//! may want to branch on carry a [`GpkgError`] as their root cause, which survives any amount of
//! added context and can be recovered with [`ErrorKind::of`].

mod conformance;
pub use conformance::*;

use thiserror::Error;

/// Classifiable root causes raised by the tile store.
#[derive(Debug, Error)]
pub enum GpkgError {
	/// The caller supplied a malformed, out-of-range or conflicting parameter.
	/// Detected before any storage mutation.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// The container failed structural validation while being opened.
	#[error(transparent)]
	Conformance(#[from] ConformanceError),

	/// The file is missing, already exists, or is not a readable database.
	#[error("file state: {0}")]
	FileState(String),

	/// A tile already exists at the same (tile set, zoom, column, row) identity.
	#[error("storage uniqueness violation: {0}")]
	StorageUniqueness(String),
}

impl GpkgError {
	#[must_use]
	pub fn kind(&self) -> ErrorKind {
		match self {
			GpkgError::InvalidArgument(_) => ErrorKind::InvalidArgument,
			GpkgError::Conformance(_) => ErrorKind::Conformance,
			GpkgError::FileState(_) => ErrorKind::FileState,
			GpkgError::StorageUniqueness(_) => ErrorKind::StorageUniqueness,
		}
	}
}

/// Coarse classification of an error, for callers that need to tell "bad input" from
/// "bad environment".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	InvalidArgument,
	Conformance,
	FileState,
	StorageUniqueness,
	/// Any other error reported by the storage engine.
	Storage,
	Other,
}

impl ErrorKind {
	/// Walks the error chain and returns the kind of the first [`GpkgError`] or
	/// [`ConformanceError`] found, or [`ErrorKind::Other`].
	///
	/// Storage engine errors are not known to this crate; the container crate refines
	/// `Other` into [`ErrorKind::Storage`] where appropriate.
	#[must_use]
	pub fn of(err: &anyhow::Error) -> ErrorKind {
		for cause in err.chain() {
			if let Some(error) = cause.downcast_ref::<GpkgError>() {
				return error.kind();
			}
			if cause.is::<ConformanceError>() {
				return ErrorKind::Conformance;
			}
		}
		ErrorKind::Other
	}
}

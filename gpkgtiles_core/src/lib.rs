//! Pure data model and coordinate algebra for tile pyramids stored in GeoPackages.
//!
//! This crate does no I/O. It contains:
//! - the record types of the tile pyramid model ([`SpatialReferenceSystem`], [`Content`],
//!   [`TileSet`], [`TileMatrixSet`], [`TileMatrix`], [`Tile`]),
//! - geometry primitives ([`BoundingBox`], [`CrsCoordinate`], tile coordinates and origins),
//! - [`CrsProfile`] implementations for the reference systems the store knows about,
//! - the [`CoordinateConverter`] mapping between reference-system coordinates, absolute
//!   tile coordinates and matrix-relative tile coordinates,
//! - the error taxonomy ([`GpkgError`], [`ErrorKind`]) and conformance report types.

pub mod macros;

mod converter;
pub use converter::*;

mod error;
pub use error::*;

mod profile;
pub use profile::*;

mod types;
pub use types::*;

#[cfg(any(test, feature = "test"))]
#[doc(hidden)]
pub use wildmatch as __wildmatch;

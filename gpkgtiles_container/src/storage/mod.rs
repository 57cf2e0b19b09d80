//! Access to the SQLite file underneath a GeoPackage.

mod error;
pub use error::*;

mod handle;
pub use handle::*;

mod open_mode;
pub use open_mode::*;

pub(crate) mod queries;
pub use queries::ColumnInfo;

//! SQLite-backed storage of tiled raster pyramids in GeoPackage files.
//!
//! The crate is organised bottom up:
//! - [`StorageHandle`]: one SQLite file, its connection pool and transactions,
//! - [`ConformanceVerifier`]: the requirement checks run when a file is opened,
//! - [`GeoPackageCore`]: reference system and content registries,
//! - [`GeoPackageTiles`]: tile sets, tile matrices and tiles,
//! - [`GeoPackage`]: the facade tying these together,
//! - [`ImageSourceReader`] / [`ImageSinkWriter`]: moving tile images in and out.
//!
//! # Quick start
//! ```rust
//! use gpkgtiles_container::GeoPackage;
//! use gpkgtiles_core::{BoundingBox, TileData};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let gpkg = GeoPackage::create(&dir.path().join("world.gpkg"))?;
//! let srs = gpkg.core().get_spatial_reference_system(4326)?.expect("default reference system");
//! let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0)?;
//!
//! let tiles = gpkg.tiles();
//! let tile_set = tiles.add_tile_set("world", "World", "", &bbox, &srs)?;
//! let matrix_set = tiles.get_tile_matrix_set(&tile_set)?;
//! let matrix = tiles.add_tile_matrix(&matrix_set, 0, 2, 1, 256, 256, None)?;
//! tiles.add_tile(&tile_set, &matrix, 1, 0, &TileData::from("image bytes"))?;
//!
//! assert_eq!(tiles.count_tiles(&tile_set)?, 1);
//! # Ok(())
//! # }
//! ```

mod catalog;
pub use catalog::{GEOPACKAGE_APPLICATION_ID, GEOPACKAGE_USER_VERSION, GeoPackageCore};

mod geopackage;
pub use geopackage::*;

mod raster;
pub use raster::*;

mod storage;
pub use storage::{ColumnInfo, OpenMode, StorageHandle, classify_error, is_unique_violation};

mod tiles;
pub use tiles::*;

mod verification;
pub use verification::*;

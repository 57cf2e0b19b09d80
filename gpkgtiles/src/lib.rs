//! # gpkgtiles
//!
//! Create, verify and query tiled raster pyramids stored in GeoPackage files.
//!
//! The library re-exports the two building blocks:
//! - [`core`]: geometry, reference systems, tile matrices and coordinate conversion,
//! - [`container`]: the SQLite-backed GeoPackage with its registries and tile store,
//!
//! and adds [`config::PyramidConfig`] for describing a pyramid in YAML.
//!
//! ## Usage Example
//!
//! ```rust
//! use gpkgtiles::{config::PyramidConfig, container::GeoPackage};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = PyramidConfig::from_string(
//! 	"tile_sets:
//!   - table_name: world
//!     identifier: World
//!     srs_id: 4326
//!     profile_zoom_levels: [0, 2]",
//! )?;
//!
//! let dir = tempfile::tempdir()?;
//! let gpkg = GeoPackage::create(&dir.path().join("world.gpkg"))?;
//! let tile_sets = config.apply(&gpkg)?;
//! assert_eq!(gpkg.tiles().get_zoom_levels(&tile_sets[0])?.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod config;

pub use gpkgtiles_container as container;
pub use gpkgtiles_core as core;

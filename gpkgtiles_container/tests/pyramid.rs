//! End to end tests of tile pyramids: create, fill, reopen, read back and export.

use anyhow::Result;
use gpkgtiles_container::*;
use gpkgtiles_core::*;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn world(gpkg: &GeoPackage) -> Result<TileSet> {
	let srs = gpkg
		.core()
		.get_spatial_reference_system(4326)?
		.expect("WGS 84 is registered by default");
	let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0)?;
	gpkg.tiles().add_tile_set("world", "World", "geodetic pyramid", &bbox, &srs)
}

fn payload(zoom: u32, column: u32, row: u32) -> TileData {
	TileData::from(format!("tile {zoom}/{column}/{row}").as_str())
}

#[test]
fn pyramid_survives_reopening() -> Result<()> {
	let dir = TempDir::new()?;
	let path = dir.path().join("world.gpkg");

	{
		let gpkg = GeoPackage::create(&path)?;
		let tile_set = world(&gpkg)?;
		let tiles = gpkg.tiles();
		let matrix_set = tiles.get_tile_matrix_set(&tile_set)?;
		let profile = GlobalGeodeticCrsProfile;
		for zoom in 0..3 {
			let dims = profile.tile_scheme().dimensions(zoom)?;
			let matrix = tiles.add_tile_matrix(&matrix_set, zoom, dims.width, dims.height, 256, 256, None)?;
			for row in 0..dims.height {
				for column in 0..dims.width {
					tiles.add_tile(&tile_set, &matrix, column, row, &payload(zoom, column, row))?;
				}
			}
		}
	}

	let gpkg = GeoPackage::open(&path)?;
	assert!(gpkg.verify()?.is_empty());

	let tiles = gpkg.tiles();
	let tile_set = tiles.get_tile_set("world")?.expect("tile set exists");
	assert_eq!(tile_set.description, "geodetic pyramid");
	assert_eq!(tiles.get_zoom_levels(&tile_set)?.into_iter().collect::<Vec<_>>(), [0, 1, 2]);
	assert_eq!(tiles.count_tiles(&tile_set)?, 2 + 8 + 32);
	assert_eq!(tiles.tile_set_state(&tile_set)?, TileSetState::Populated);
	assert_eq!(tiles.get_tile_set_bounds_at(&tile_set, 2)?, Some((0, 0, 7, 3)));

	let tile = tiles.get_tile(&tile_set, 5, 1, 2)?.expect("tile exists");
	assert_eq!(tile.data, payload(2, 5, 1));

	for tile in tiles.tiles(&tile_set, Some(1))? {
		let tile = tile?;
		assert_eq!(tile.data, payload(1, tile.column, tile.row));
	}
	Ok(())
}

#[test]
fn global_grid_matches_relative_grid() -> Result<()> {
	let dir = TempDir::new()?;
	let gpkg = GeoPackage::create(&dir.path().join("grid.gpkg"))?;
	let tile_set = world(&gpkg)?;
	let tiles = gpkg.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set)?;
	let matrix = tiles.add_tile_matrix(&matrix_set, 3, 16, 8, 256, 256, None)?;
	let profile = GlobalGeodeticCrsProfile;

	// Berlin
	let coordinate = CrsCoordinate::new(13.4, 52.5, CoordinateReferenceSystem::epsg(4326));
	let absolute = crs_to_absolute(&profile, &coordinate, 3, TileOrigin::UpperLeft)?;
	let relative = tiles.get_tile_coordinate(&tile_set, &coordinate, profile.precision(), 3)?;
	assert_eq!((absolute.x, absolute.y), (relative.column, relative.row));
	assert_eq!(absolute_to_relative(&profile, &matrix_set, &matrix, &absolute)?, relative);
	Ok(())
}

#[test]
fn lower_left_producer_is_flipped() -> Result<()> {
	let dir = TempDir::new()?;
	let gpkg = GeoPackage::create(&dir.path().join("flip.gpkg"))?;
	let tile_set = world(&gpkg)?;
	let tiles = gpkg.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set)?;
	let matrix = tiles.add_tile_matrix(&matrix_set, 2, 8, 4, 256, 256, None)?;

	// a producer counting rows from the bottom delivers its row 0
	let (column, row) = TileOrigin::LowerLeft.transform(TileOrigin::UpperLeft, 6, 0, matrix.dimensions())?;
	tiles.add_tile(&tile_set, &matrix, column, row, &TileData::from("south"))?;

	let stored = tiles.get_tile(&tile_set, 6, 3, 2)?.expect("bottom row");
	assert_eq!(stored.data.as_slice(), b"south");
	let bounds = tiles.get_tile_bounds(&tile_set, &matrix, 6, 3)?;
	assert_eq!(bounds.min_y, -90.0);
	Ok(())
}

#[test]
fn import_and_export_images() -> Result<()> {
	let dir = TempDir::new()?;
	let gpkg = GeoPackage::create(&dir.path().join("images.gpkg"))?;
	let tile_set = world(&gpkg)?;
	let tiles = gpkg.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set)?;
	let matrix = tiles.add_tile_matrix(&matrix_set, 0, 2, 1, 256, 256, None)?;

	let image = dir.path().join("west.png");
	fs::write(&image, b"\x89PNG\r\n\x1a\nwest")?;
	let (data, mime_type) = FileImageSource::new(&image).read()?;
	assert_eq!(mime_type, "image/png");
	tiles.add_tile(&tile_set, &matrix, 0, 0, &TileData::from(data))?;

	let out = dir.path().join("out");
	let mut sink = DirectoryImageSink::new(&out)?;
	for tile in tiles.tiles(&tile_set, None)? {
		let tile = tile?;
		let mime_type = tile.data.sniff_mime_type().unwrap_or("application/octet-stream");
		sink.write(tile.zoom_level, tile.column, tile.row, tile.data.as_slice(), mime_type)?;
	}
	assert_eq!(sink.written(), 1);
	assert_eq!(fs::read(out.join("0/0/0.png"))?, b"\x89PNG\r\n\x1a\nwest");
	Ok(())
}

#[test]
fn duplicate_tiles_keep_the_first_payload() -> Result<()> {
	let dir = TempDir::new()?;
	let gpkg = GeoPackage::create(&dir.path().join("dup.gpkg"))?;
	let tile_set = world(&gpkg)?;
	let tiles = gpkg.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set)?;
	let matrix = tiles.add_tile_matrix(&matrix_set, 0, 2, 1, 256, 256, None)?;

	tiles.add_tile(&tile_set, &matrix, 1, 0, &TileData::from("first"))?;
	let err = tiles
		.add_tile(&tile_set, &matrix, 1, 0, &TileData::from("second"))
		.unwrap_err();
	assert_eq!(classify_error(&err), ErrorKind::StorageUniqueness);
	assert_eq!(
		tiles.get_tile(&tile_set, 1, 0, 0)?.map(|tile| tile.data),
		Some(TileData::from("first"))
	);
	Ok(())
}

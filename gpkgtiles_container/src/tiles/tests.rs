use super::*;
use crate::{GeoPackageCore, storage::OpenMode};
use anyhow::Result;
use assert_fs::NamedTempFile;
use gpkgtiles_core::{CoordinateReferenceSystem, ErrorKind};
use pretty_assertions::assert_eq;
use rstest::rstest;

struct Fixture {
	_file: NamedTempFile,
	handle: StorageHandle,
}

impl Fixture {
	fn new() -> Fixture {
		let file = NamedTempFile::new("tiles.gpkg").unwrap();
		let handle = StorageHandle::open(file.path(), OpenMode::CreateNew).unwrap();
		GeoPackageCore::new(&handle).create_default_tables().unwrap();
		Fixture { _file: file, handle }
	}

	fn tiles(&self) -> GeoPackageTiles<'_> {
		GeoPackageTiles::new(&self.handle)
	}

	fn wgs84(&self) -> SpatialReferenceSystem {
		GeoPackageCore::new(&self.handle)
			.get_spatial_reference_system(4326)
			.unwrap()
			.unwrap()
	}

	/// Tile set over (0, 0, 30, 50) with a 2x2 matrix at zoom level 15.
	fn tile_set(&self) -> (TileSet, TileMatrix) {
		let tiles = self.tiles();
		let tile_set = tiles
			.add_tile_set("ortho", "Ortho", "aerial images", &bbox(), &self.wgs84())
			.unwrap();
		let matrix_set = tiles.get_tile_matrix_set(&tile_set).unwrap();
		let matrix = tiles.add_tile_matrix(&matrix_set, 15, 2, 2, 256, 256, None).unwrap();
		(tile_set, matrix)
	}
}

fn bbox() -> BoundingBox {
	BoundingBox::new(0.0, 0.0, 30.0, 50.0).unwrap()
}

fn kind<T: std::fmt::Debug>(result: Result<T>) -> ErrorKind {
	ErrorKind::of(&result.unwrap_err())
}

#[test]
fn add_tile_set_creates_all_rows() {
	let fixture = Fixture::new();
	let tiles = fixture.tiles();
	let tile_set = tiles
		.add_tile_set("ortho", "Ortho", "aerial images", &bbox(), &fixture.wgs84())
		.unwrap();

	assert_eq!(tile_set.table_name, "ortho");
	assert_eq!(tile_set.identifier, "Ortho");
	assert_eq!(tile_set.description, "aerial images");
	assert_eq!(tile_set.bounding_box, bbox());
	assert_eq!(tile_set.srs_id, 4326);

	assert!(fixture.handle.table_exists("ortho").unwrap());
	assert!(fixture.handle.table_exists("gpkg_tile_matrix_set").unwrap());
	assert!(fixture.handle.table_exists("gpkg_tile_matrix").unwrap());

	let matrix_set = tiles.get_tile_matrix_set(&tile_set).unwrap();
	assert_eq!(matrix_set.srs, fixture.wgs84());
	assert_eq!(matrix_set.bounding_box, bbox());

	assert_eq!(tiles.get_tile_set("ortho").unwrap(), Some(tile_set.clone()));
	assert_eq!(tiles.get_tile_set("missing").unwrap(), None);
	assert_eq!(tiles.tile_set_state(&tile_set).unwrap(), TileSetState::Registered);
}

#[test]
fn add_tile_set_is_idempotent() {
	let fixture = Fixture::new();
	let tiles = fixture.tiles();
	let srs = fixture.wgs84();
	let first = tiles.add_tile_set("ortho", "Ortho", "", &bbox(), &srs).unwrap();
	let second = tiles.add_tile_set("ortho", "Ortho", "", &bbox(), &srs).unwrap();
	assert_eq!(first, second);
	assert_eq!(tiles.get_tile_sets(None).unwrap().len(), 1);
}

#[rstest]
#[case::identifier("ortho", "Other", "", bbox())]
#[case::description("ortho", "Ortho", "changed", bbox())]
#[case::bounding_box("ortho", "Ortho", "", BoundingBox::new(0.0, 0.0, 30.0, 60.0).unwrap())]
#[case::invalid_name("gpkg_ortho", "Ortho 2", "", bbox())]
#[case::quote_in_name("or\"tho", "Ortho 2", "", bbox())]
#[case::empty_identifier("ortho_2", "", "", bbox())]
#[case::flat_bounding_box("ortho_2", "Ortho 2", "", BoundingBox::new(0.0, 0.0, 30.0, 0.0).unwrap())]
#[case::identifier_taken("ortho_2", "Ortho", "", bbox())]
fn add_tile_set_conflicts(
	#[case] name: &str,
	#[case] identifier: &str,
	#[case] description: &str,
	#[case] bounding_box: BoundingBox,
) {
	let fixture = Fixture::new();
	let tiles = fixture.tiles();
	tiles
		.add_tile_set("ortho", "Ortho", "", &bbox(), &fixture.wgs84())
		.unwrap();
	let result = tiles.add_tile_set(name, identifier, description, &bounding_box, &fixture.wgs84());
	assert_eq!(kind(result), ErrorKind::InvalidArgument);

	// nothing of a rejected tile set is left behind
	assert_eq!(tiles.get_tile_sets(None).unwrap().len(), 1);
	assert!(!fixture.handle.table_exists("ortho_2").unwrap());
}

#[test]
fn add_tile_set_requires_registered_srs() {
	let fixture = Fixture::new();
	let unregistered = SpatialReferenceSystem::new("mercator", 3857, "EPSG", 3857, "def", None).unwrap();
	let result = fixture
		.tiles()
		.add_tile_set("ortho", "Ortho", "", &bbox(), &unregistered);
	assert_eq!(kind(result), ErrorKind::InvalidArgument);
	assert!(!fixture.handle.table_exists("ortho").unwrap());
}

#[test]
fn add_tile_set_rejects_existing_table() {
	let fixture = Fixture::new();
	fixture.handle.execute_batch("CREATE TABLE ortho (id INTEGER);").unwrap();
	let result = fixture
		.tiles()
		.add_tile_set("ortho", "Ortho", "", &bbox(), &fixture.wgs84());
	assert_eq!(kind(result), ErrorKind::InvalidArgument);
}

#[test]
fn tile_sets_filtered_by_srs() {
	let fixture = Fixture::new();
	let core = GeoPackageCore::new(&fixture.handle);
	let tiles = fixture.tiles();
	let mercator = core
		.add_spatial_reference_system("WGS 84 / Pseudo-Mercator", 3857, "EPSG", 3857, "def", None)
		.unwrap();
	tiles.add_tile_set("b_geo", "B", "", &bbox(), &fixture.wgs84()).unwrap();
	tiles.add_tile_set("a_merc", "A", "", &bbox(), &mercator).unwrap();

	let names = |srs: Option<&SpatialReferenceSystem>| {
		tiles
			.get_tile_sets(srs)
			.unwrap()
			.into_iter()
			.map(|set| set.table_name)
			.collect::<Vec<_>>()
	};
	assert_eq!(names(None), ["a_merc", "b_geo"]);
	assert_eq!(names(Some(&mercator)), ["a_merc"]);
	assert_eq!(names(Some(&fixture.wgs84())), ["b_geo"]);
}

#[test]
fn tile_matrix_derives_pixel_size() {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	assert_eq!(matrix.zoom_level, 15);
	assert_eq!(matrix.pixel_x_size, 30.0 / 512.0);
	assert_eq!(matrix.pixel_y_size, 50.0 / 512.0);

	let tiles = fixture.tiles();
	assert_eq!(tiles.get_tile_matrix(&tile_set, 15).unwrap(), Some(matrix));
	assert_eq!(tiles.get_tile_matrix(&tile_set, 14).unwrap(), None);
	assert_eq!(tiles.tile_set_state(&tile_set).unwrap(), TileSetState::Defined);
}

#[test]
fn tile_matrix_add_or_get() {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	let tiles = fixture.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set).unwrap();

	let again = tiles
		.add_tile_matrix(&matrix_set, 15, 2, 2, 256, 256, Some((30.0 / 512.0, 50.0 / 512.0)))
		.unwrap();
	assert_eq!(again, matrix);

	let result = tiles.add_tile_matrix(&matrix_set, 15, 4, 4, 256, 256, None);
	assert_eq!(kind(result), ErrorKind::InvalidArgument);

	tiles.add_tile_matrix(&matrix_set, 3, 1, 1, 256, 256, None).unwrap();
	tiles.add_tile_matrix(&matrix_set, 16, 3, 5, 256, 256, None).unwrap();
	assert_eq!(
		tiles.get_zoom_levels(&tile_set).unwrap().into_iter().collect::<Vec<_>>(),
		[3, 15, 16]
	);
}

#[rstest]
#[case::matrix_width(0, 2, 256, 256, None)]
#[case::matrix_height(2, 0, 256, 256, None)]
#[case::tile_width(2, 2, 0, 256, None)]
#[case::tile_height(2, 2, 256, 0, None)]
#[case::pixel_x_size(2, 2, 256, 256, Some((0.0, 1.0)))]
#[case::pixel_y_size(2, 2, 256, 256, Some((1.0, -1.0)))]
#[case::pixel_nan(2, 2, 256, 256, Some((f64::NAN, 1.0)))]
fn tile_matrix_rejects_invalid_values(
	#[case] matrix_width: u32,
	#[case] matrix_height: u32,
	#[case] tile_width: u32,
	#[case] tile_height: u32,
	#[case] pixel_size: Option<(f64, f64)>,
) {
	let fixture = Fixture::new();
	let (tile_set, _) = fixture.tile_set();
	let tiles = fixture.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set).unwrap();
	let result = tiles.add_tile_matrix(
		&matrix_set,
		4,
		matrix_width,
		matrix_height,
		tile_width,
		tile_height,
		pixel_size,
	);
	assert_eq!(kind(result), ErrorKind::InvalidArgument);
	assert_eq!(tiles.get_tile_matrix(&tile_set, 4).unwrap(), None);
}

#[test]
fn tile_matrix_requires_tile_set() {
	let fixture = Fixture::new();
	let matrix_set = TileMatrixSet {
		table_name: "missing".into(),
		srs: fixture.wgs84(),
		bounding_box: bbox(),
	};
	let result = fixture.tiles().add_tile_matrix(&matrix_set, 0, 1, 1, 256, 256, None);
	assert_eq!(kind(result), ErrorKind::InvalidArgument);
}

#[test]
fn add_and_get_tiles() {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	let tiles = fixture.tiles();

	let tile = tiles.add_tile(&tile_set, &matrix, 1, 0, &TileData::from("image")).unwrap();
	assert_eq!((tile.zoom_level, tile.column, tile.row), (15, 1, 0));

	let stored = tiles.get_tile(&tile_set, 1, 0, 15).unwrap().unwrap();
	assert_eq!(stored, tile);
	assert_eq!(stored.data.as_slice(), b"image");

	assert_eq!(tiles.get_tile(&tile_set, 0, 0, 15).unwrap(), None);
	assert_eq!(tiles.count_tiles(&tile_set).unwrap(), 1);
	assert_eq!(tiles.count_tiles_at(&tile_set, 15).unwrap(), 1);
	assert_eq!(tiles.count_tiles_at(&tile_set, 14).unwrap(), 0);
	assert_eq!(tiles.tile_set_state(&tile_set).unwrap(), TileSetState::Populated);
}

#[test]
fn get_tile_without_matrix_is_not_found() {
	let fixture = Fixture::new();
	let (tile_set, _) = fixture.tile_set();
	let tiles = fixture.tiles();
	assert_eq!(tiles.get_tile(&tile_set, 0, 0, 3).unwrap(), None);
	assert_eq!(tiles.get_tile(&tile_set, 100, 100, 3).unwrap(), None);
	assert_eq!(kind(tiles.get_tile(&tile_set, 2, 0, 15)), ErrorKind::InvalidArgument);
	assert_eq!(kind(tiles.get_tile(&tile_set, 0, 2, 15)), ErrorKind::InvalidArgument);
}

#[rstest]
#[case::column_out_of_range(2, 0, "x")]
#[case::row_out_of_range(0, 2, "x")]
#[case::empty_data(0, 0, "")]
fn add_tile_rejects_invalid_input(#[case] column: u32, #[case] row: u32, #[case] data: &str) {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	let tiles = fixture.tiles();
	let result = tiles.add_tile(&tile_set, &matrix, column, row, &TileData::from(data));
	assert_eq!(kind(result), ErrorKind::InvalidArgument);
	assert_eq!(tiles.count_tiles(&tile_set).unwrap(), 0);
}

#[test]
fn add_tile_requires_stored_matrix() {
	let fixture = Fixture::new();
	let (tile_set, _) = fixture.tile_set();
	let unstored = TileMatrix::with_derived_pixel_size("ortho", 7, 2, 2, 256, 256, &bbox()).unwrap();
	let result = fixture
		.tiles()
		.add_tile(&tile_set, &unstored, 0, 0, &TileData::from("x"));
	assert_eq!(kind(result), ErrorKind::InvalidArgument);

	let foreign = TileMatrix::with_derived_pixel_size("other", 15, 2, 2, 256, 256, &bbox()).unwrap();
	let result = fixture
		.tiles()
		.add_tile(&tile_set, &foreign, 0, 0, &TileData::from("x"));
	assert_eq!(kind(result), ErrorKind::InvalidArgument);
}

#[test]
fn duplicate_tile_is_rejected() {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	let tiles = fixture.tiles();
	tiles.add_tile(&tile_set, &matrix, 0, 1, &TileData::from("first")).unwrap();

	let result = tiles.add_tile(&tile_set, &matrix, 0, 1, &TileData::from("second"));
	assert_eq!(kind(result), ErrorKind::StorageUniqueness);

	let stored = tiles.get_tile(&tile_set, 0, 1, 15).unwrap().unwrap();
	assert_eq!(stored.data.as_slice(), b"first");
	assert_eq!(tiles.count_tiles(&tile_set).unwrap(), 1);
}

#[rstest]
#[case::right_edge(29.9, 30.0, 1, 0)]
#[case::left_edge(0.0, 40.0, 0, 0)]
#[case::bottom_edge(20.0, 0.01, 1, 1)]
#[case::upper_right_corner(30.0, 50.0, 1, 0)]
#[case::lower_left_corner(0.0, 0.0, 0, 1)]
#[case::center(15.0, 25.0, 1, 1)]
fn tiles_by_coordinate(#[case] x: f64, #[case] y: f64, #[case] column: u32, #[case] row: u32) {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	let tiles = fixture.tiles();
	let coordinate = CrsCoordinate::new(x, y, CoordinateReferenceSystem::epsg(4326));

	assert_eq!(
		tiles.get_tile_coordinate(&tile_set, &coordinate, 7, 15).unwrap(),
		RelativeTileCoordinate::new(column, row)
	);

	let tile = tiles
		.add_tile_at(&tile_set, &matrix, &coordinate, 7, &TileData::from("image"))
		.unwrap();
	assert_eq!((tile.column, tile.row), (column, row));
	assert_eq!(tiles.get_tile_at(&tile_set, &coordinate, 7, 15).unwrap(), Some(tile));
}

#[test]
fn tile_by_coordinate_errors() {
	let fixture = Fixture::new();
	let (tile_set, _) = fixture.tile_set();
	let tiles = fixture.tiles();
	let inside = CrsCoordinate::new(10.0, 10.0, CoordinateReferenceSystem::epsg(4326));
	let outside = CrsCoordinate::new(31.0, 10.0, CoordinateReferenceSystem::epsg(4326));
	let wrong_crs = CrsCoordinate::new(10.0, 10.0, CoordinateReferenceSystem::epsg(3857));

	assert_eq!(kind(tiles.get_tile_at(&tile_set, &inside, 7, 3)), ErrorKind::InvalidArgument);
	assert_eq!(kind(tiles.get_tile_at(&tile_set, &outside, 7, 15)), ErrorKind::InvalidArgument);
	assert_eq!(kind(tiles.get_tile_at(&tile_set, &wrong_crs, 7, 15)), ErrorKind::InvalidArgument);
	assert_eq!(tiles.get_tile_at(&tile_set, &inside, 7, 15).unwrap(), None);
}

#[test]
fn tile_corners_and_bounds() {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	let tiles = fixture.tiles();

	let corner = tiles.get_crs_coordinate(&tile_set, 1, 1, 15).unwrap();
	assert_eq!((corner.x, corner.y), (15.0, 25.0));
	assert_eq!(
		tiles.get_tile_coordinate(&tile_set, &corner, 7, 15).unwrap(),
		RelativeTileCoordinate::new(1, 1)
	);

	let bounds = tiles.get_tile_bounds(&tile_set, &matrix, 0, 1).unwrap();
	assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 15.0, 25.0).unwrap());
	assert!(tiles.get_tile_bounds(&tile_set, &matrix, 2, 1).is_err());
	assert_eq!(kind(tiles.get_crs_coordinate(&tile_set, 0, 0, 3)), ErrorKind::InvalidArgument);
}

#[test]
fn occupied_index_range() {
	let fixture = Fixture::new();
	let (tile_set, _) = fixture.tile_set();
	let tiles = fixture.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set).unwrap();
	let matrix = tiles.add_tile_matrix(&matrix_set, 16, 4, 4, 256, 256, None).unwrap();

	assert_eq!(tiles.get_tile_set_bounds_at(&tile_set, 16).unwrap(), None);
	for (column, row) in [(1, 3), (2, 1), (3, 2)] {
		tiles.add_tile(&tile_set, &matrix, column, row, &TileData::from("x")).unwrap();
	}
	assert_eq!(tiles.get_tile_set_bounds_at(&tile_set, 16).unwrap(), Some((1, 1, 3, 3)));
	assert_eq!(tiles.get_tile_set_bounds_at(&tile_set, 15).unwrap(), None);
}

#[test]
fn tile_iteration() {
	let fixture = Fixture::new();
	let (tile_set, matrix15) = fixture.tile_set();
	let tiles = fixture.tiles();
	let matrix_set = tiles.get_tile_matrix_set(&tile_set).unwrap();
	let matrix16 = tiles.add_tile_matrix(&matrix_set, 16, 4, 4, 256, 256, None).unwrap();

	for row in 0..2 {
		for column in 0..2 {
			tiles.add_tile(&tile_set, &matrix15, column, row, &TileData::from("a")).unwrap();
		}
	}
	for column in 0..4 {
		tiles.add_tile(&tile_set, &matrix16, column, 3, &TileData::from("b")).unwrap();
	}

	let all = tiles
		.tiles(&tile_set, None)
		.unwrap()
		.with_page_size(3)
		.collect::<Result<Vec<_>>>()
		.unwrap();
	assert_eq!(all.len(), 8);
	assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));

	let zoom16 = tiles
		.tiles(&tile_set, Some(16))
		.unwrap()
		.with_page_size(2)
		.map(|tile| tile.map(|tile| tile.column))
		.collect::<Result<Vec<_>>>()
		.unwrap();
	assert_eq!(zoom16, [0, 1, 2, 3]);

	assert_eq!(tiles.tiles(&tile_set, Some(3)).unwrap().count(), 0);

	// a second pass sees the same tiles again
	assert_eq!(tiles.tiles(&tile_set, None).unwrap().count(), 8);
}

#[test]
fn iteration_can_be_interleaved_with_writes() {
	let fixture = Fixture::new();
	let (tile_set, matrix) = fixture.tile_set();
	let tiles = fixture.tiles();
	tiles.add_tile(&tile_set, &matrix, 0, 0, &TileData::from("a")).unwrap();
	tiles.add_tile(&tile_set, &matrix, 1, 0, &TileData::from("b")).unwrap();

	let mut iter = tiles.tiles(&tile_set, None).unwrap().with_page_size(1);
	assert_eq!(iter.next().unwrap().unwrap().column, 0);
	tiles.add_tile(&tile_set, &matrix, 0, 1, &TileData::from("c")).unwrap();
	let rest = iter.collect::<Result<Vec<_>>>().unwrap();
	assert_eq!(rest.len(), 2);
}

#[test]
fn invalid_stored_matrix_is_rejected() {
	let fixture = Fixture::new();
	let (tile_set, _) = fixture.tile_set();
	fixture
		.handle
		.execute_batch("UPDATE gpkg_tile_matrix SET matrix_width = 0 WHERE zoom_level = 15;")
		.unwrap();
	let tiles = fixture.tiles();
	let inside = CrsCoordinate::new(10.0, 10.0, CoordinateReferenceSystem::epsg(4326));

	assert_eq!(kind(tiles.get_tile_matrix(&tile_set, 15)), ErrorKind::InvalidArgument);
	assert_eq!(kind(tiles.get_tile_matrices(&tile_set)), ErrorKind::InvalidArgument);
	assert_eq!(kind(tiles.get_tile_coordinate(&tile_set, &inside, 7, 15)), ErrorKind::InvalidArgument);
	assert_eq!(kind(tiles.get_tile_at(&tile_set, &inside, 7, 15)), ErrorKind::InvalidArgument);
}

use anyhow::{Result, bail};
use gpkgtiles::{
	container::{FileImageSource, GeoPackage, ImageSourceReader},
	core::{CrsCoordinate, TileData, TileOrigin, invalid_argument},
};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage file
	#[arg()]
	filename: PathBuf,

	/// name of the tile set
	#[arg()]
	tile_set: String,

	/// zoom level, must have a tile matrix
	#[arg()]
	zoom: u32,

	/// image file to store
	#[arg()]
	input: PathBuf,

	/// tile column
	#[arg(long, requires = "row", conflicts_with_all = ["x", "y"], display_order = 1)]
	column: Option<u32>,

	/// tile row, counted from the top unless --lower-left is set
	#[arg(long, requires = "column", display_order = 1)]
	row: Option<u32>,

	/// x coordinate in the tile set's reference system; the tile containing it is used
	#[arg(long, requires = "y", allow_hyphen_values = true, display_order = 2)]
	x: Option<f64>,

	/// y coordinate in the tile set's reference system
	#[arg(long, requires = "x", allow_hyphen_values = true, display_order = 2)]
	y: Option<f64>,

	/// number of decimal places of --x and --y that are significant
	#[arg(long, default_value_t = 7, display_order = 2)]
	precision: u32,

	/// rows are counted from the bottom, as in TMS
	#[arg(long, display_order = 3)]
	lower_left: bool,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("import {:?} into {:?}", arguments.input, arguments.filename);

	let gpkg = GeoPackage::open(&arguments.filename)?;
	let tiles = gpkg.tiles();
	let tile_set = tiles
		.get_tile_set(&arguments.tile_set)?
		.ok_or_else(|| invalid_argument!("tile set '{}' does not exist", arguments.tile_set))?;
	let matrix = tiles.get_tile_matrix(&tile_set, arguments.zoom)?.ok_or_else(|| {
		invalid_argument!(
			"tile set '{}' has no tile matrix at zoom level {}",
			tile_set.table_name,
			arguments.zoom
		)
	})?;

	let (data, mime_type) = FileImageSource::new(&arguments.input).read()?;
	log::debug!("read {} bytes of {mime_type}", data.len());
	let data = TileData::from(data);

	let tile = match (arguments.column, arguments.row, arguments.x, arguments.y) {
		(Some(column), Some(row), None, None) => {
			let (column, row) = if arguments.lower_left {
				TileOrigin::LowerLeft.transform(TileOrigin::UpperLeft, column, row, matrix.dimensions())?
			} else {
				(column, row)
			};
			tiles.add_tile(&tile_set, &matrix, column, row, &data)?
		}
		(None, None, Some(x), Some(y)) => {
			let crs = tiles.get_tile_matrix_set(&tile_set)?.srs.crs();
			let coordinate = CrsCoordinate::new(x, y, crs);
			tiles.add_tile_at(&tile_set, &matrix, &coordinate, arguments.precision, &data)?
		}
		_ => bail!("either --column and --row or --x and --y are required"),
	};

	println!("stored tile {}/{}/{}", tile.zoom_level, tile.column, tile.row);
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use assert_fs::{TempDir, prelude::*};
	use gpkgtiles::{config::PyramidConfig, container::GeoPackage};
	use rstest::rstest;
	use std::path::{Path, PathBuf};

	fn example(dir: &TempDir) -> (PathBuf, PathBuf) {
		let path = dir.path().join("import.gpkg");
		let gpkg = GeoPackage::create(&path).unwrap();
		PyramidConfig::from_path(Path::new("../testdata/pyramid.yml"))
			.unwrap()
			.apply(&gpkg)
			.unwrap();
		let image = dir.child("tile.png");
		image.write_binary(b"\x89PNG\r\n\x1a\n....").unwrap();
		(path, image.path().to_path_buf())
	}

	#[rstest]
	#[case::upper_left(&["--column", "3", "--row", "0"], (3, 0))]
	#[case::lower_left(&["--column", "3", "--row", "0", "--lower-left"], (3, 1))]
	#[case::coordinate(&["--x", "-10.5", "--y", "45"], (1, 0))]
	#[case::south_east_corner(&["--x", "180", "--y", "-90"], (3, 1))]
	fn import_tile(#[case] position: &[&str], #[case] expected: (u32, u32)) {
		let dir = TempDir::new().unwrap();
		let (path, image) = example(&dir);
		let mut args = vec![
			"gpkgtiles",
			"import",
			"-q",
			path.to_str().unwrap(),
			"world",
			"1",
			image.to_str().unwrap(),
		];
		args.extend_from_slice(position);
		run_command(args).unwrap();

		let gpkg = GeoPackage::open(&path).unwrap();
		let tiles = gpkg.tiles();
		let world = tiles.get_tile_set("world").unwrap().unwrap();
		let tile = tiles
			.get_tile(&world, expected.0, expected.1, 1)
			.unwrap()
			.expect("tile was stored");
		assert_eq!(tile.data.sniff_mime_type(), Some("image/png"));
	}

	#[rstest]
	#[case::no_position(&[])]
	#[case::outside_matrix(&["--column", "4", "--row", "0"])]
	#[case::outside_bounds(&["--x", "200", "--y", "0"])]
	#[case::mixed(&["--column", "0", "--row", "0", "--x", "1", "--y", "1"])]
	fn import_fails(#[case] position: &[&str]) {
		let dir = TempDir::new().unwrap();
		let (path, image) = example(&dir);
		let mut args = vec![
			"gpkgtiles",
			"import",
			"-q",
			path.to_str().unwrap(),
			"world",
			"1",
			image.to_str().unwrap(),
		];
		args.extend_from_slice(position);
		assert!(run_command(args).is_err());
	}
}

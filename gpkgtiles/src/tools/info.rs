use anyhow::Result;
use gpkgtiles::{
	container::{GeoPackage, GeoPackageTiles},
	core::{TileSet, invalid_argument},
};
use std::{fmt::Write, path::PathBuf};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage file to inspect
	#[arg()]
	filename: PathBuf,

	/// show only this tile set
	#[arg(long, short, value_name = "TABLE")]
	tile_set: Option<String>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("info {:?}", arguments.filename);
	let gpkg = GeoPackage::open(&arguments.filename)?;
	print!("{}", describe(&gpkg, arguments.tile_set.as_deref())?);
	Ok(())
}

fn describe(gpkg: &GeoPackage, only: Option<&str>) -> Result<String> {
	let tiles = gpkg.tiles();
	let tile_sets = match only {
		Some(name) => vec![
			tiles
				.get_tile_set(name)?
				.ok_or_else(|| invalid_argument!("tile set '{name}' does not exist"))?,
		],
		None => tiles.get_tile_sets(None)?,
	};

	let mut text = String::new();
	for tile_set in &tile_sets {
		describe_tile_set(&mut text, gpkg, &tiles, tile_set)?;
	}
	if tile_sets.is_empty() {
		text.push_str("no tile sets\n");
	}
	Ok(text)
}

fn describe_tile_set(text: &mut String, gpkg: &GeoPackage, tiles: &GeoPackageTiles<'_>, tile_set: &TileSet) -> Result<()> {
	let srs = gpkg.core().get_spatial_reference_system(tile_set.srs_id)?;
	let crs = srs.map_or_else(|| format!("srs_id {}", tile_set.srs_id), |srs| srs.crs().to_string());

	writeln!(text, "tile set '{}' ({})", tile_set.table_name, tile_set.identifier)?;
	if !tile_set.description.is_empty() {
		writeln!(text, "  description: {}", tile_set.description)?;
	}
	writeln!(text, "  reference system: {crs}")?;
	writeln!(text, "  bounds: {}", tile_set.bounding_box.as_string_list())?;
	writeln!(text, "  last change: {}", tile_set.last_change)?;
	writeln!(text, "  state: {:?}", tiles.tile_set_state(tile_set)?)?;
	writeln!(text, "  tiles: {}", tiles.count_tiles(tile_set)?)?;

	for matrix in tiles.get_tile_matrices(tile_set)? {
		let count = tiles.count_tiles_at(tile_set, matrix.zoom_level)?;
		write!(
			text,
			"  zoom {}: {}x{} tiles of {}x{} px, pixel size {} x {}, {count} stored",
			matrix.zoom_level,
			matrix.matrix_width,
			matrix.matrix_height,
			matrix.tile_width,
			matrix.tile_height,
			matrix.pixel_x_size,
			matrix.pixel_y_size,
		)?;
		if let Some((x0, y0, x1, y1)) = tiles.get_tile_set_bounds_at(tile_set, matrix.zoom_level)? {
			write!(text, " in columns {x0}..={x1}, rows {y0}..={y1}")?;
		}
		text.push('\n');
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::run_command;
	use assert_fs::TempDir;
	use gpkgtiles::{
		config::PyramidConfig,
		core::{ErrorKind, TileData, assert_wildcard},
	};
	use std::path::Path;

	fn example(dir: &TempDir) -> (PathBuf, GeoPackage) {
		let path = dir.path().join("info.gpkg");
		let gpkg = GeoPackage::create(&path).unwrap();
		PyramidConfig::from_path(Path::new("../testdata/pyramid.yml"))
			.unwrap()
			.apply(&gpkg)
			.unwrap();
		(path, gpkg)
	}

	#[test]
	fn describes_tile_sets() {
		let dir = TempDir::new().unwrap();
		let (_, gpkg) = example(&dir);
		let tiles = gpkg.tiles();
		let world = tiles.get_tile_set("world").unwrap().unwrap();
		let matrix = tiles.get_tile_matrix(&world, 1).unwrap().unwrap();
		tiles.add_tile(&world, &matrix, 3, 1, &TileData::from("x")).unwrap();
		tiles.add_tile(&world, &matrix, 2, 0, &TileData::from("x")).unwrap();

		let text = describe(&gpkg, Some("world")).unwrap();
		let lines = text.lines().collect::<Vec<_>>();
		assert_eq!(lines[0], "tile set 'world' (world)");
		assert_eq!(lines[1], "  reference system: EPSG:4326");
		assert_eq!(lines[2], "  bounds: -180,-90,180,90");
		assert_wildcard!(lines[3], "  last change: ????-??-??T??:??:??.???Z");
		assert_eq!(lines[4], "  state: Populated");
		assert_eq!(lines[5], "  tiles: 2");
		assert_eq!(
			lines[7],
			"  zoom 1: 4x2 tiles of 256x256 px, pixel size 0.3515625 x 0.3515625, 2 stored in columns 2..=3, rows 0..=1"
		);

		let all = describe(&gpkg, None).unwrap();
		assert!(all.starts_with("tile set 'ortho' (Orthophotos)\n  description: aerial images 2024\n"));
	}

	#[test]
	fn unknown_tile_set() {
		let dir = TempDir::new().unwrap();
		let (_, gpkg) = example(&dir);
		let err = describe(&gpkg, Some("nope")).unwrap_err();
		assert_eq!(ErrorKind::of(&err), ErrorKind::InvalidArgument);
	}

	#[test]
	fn run_info() {
		let dir = TempDir::new().unwrap();
		let (path, gpkg) = example(&dir);
		drop(gpkg);
		run_command(vec!["gpkgtiles", "info", "-q", path.to_str().unwrap()]).unwrap();
		run_command(vec!["gpkgtiles", "info", "-q", "-t", "ortho", path.to_str().unwrap()]).unwrap();
	}
}

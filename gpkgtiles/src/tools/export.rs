use anyhow::Result;
use gpkgtiles::{
	container::{DirectoryImageSink, GeoPackage, ImageSinkWriter},
	core::invalid_argument,
};
use std::path::PathBuf;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage file
	#[arg()]
	filename: PathBuf,

	/// name of the tile set
	#[arg()]
	tile_set: String,

	/// output directory, tiles are written to <DIR>/<zoom>/<column>/<row>.<ext>
	#[arg()]
	output: PathBuf,

	/// export only this zoom level
	#[arg(long, short, value_name = "int")]
	zoom: Option<u32>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("export '{}' to {:?}", arguments.tile_set, arguments.output);

	let gpkg = GeoPackage::open(&arguments.filename)?;
	let tiles = gpkg.tiles();
	let tile_set = tiles
		.get_tile_set(&arguments.tile_set)?
		.ok_or_else(|| invalid_argument!("tile set '{}' does not exist", arguments.tile_set))?;

	let mut sink = DirectoryImageSink::new(&arguments.output)?;
	for tile in tiles.tiles(&tile_set, arguments.zoom)? {
		let tile = tile?;
		let mime_type = tile.data.sniff_mime_type().unwrap_or(OCTET_STREAM);
		sink.write(tile.zoom_level, tile.column, tile.row, tile.data.as_slice(), mime_type)?;
	}

	println!("exported {} tiles", sink.written());
	Ok(())
}

use anyhow::Result;
use gpkgtiles::{config::PyramidConfig, container::GeoPackage};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage file to create, must not exist yet
	#[arg()]
	filename: PathBuf,

	/// YAML file describing reference systems, tile sets and tile matrices
	#[arg(long, short, value_name = "FILE")]
	config: Option<PathBuf>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("create {:?}", arguments.filename);

	let config = match &arguments.config {
		Some(path) => PyramidConfig::from_path(path)?,
		None => PyramidConfig::default(),
	};

	let gpkg = GeoPackage::create(&arguments.filename)?;
	for tile_set in config.apply(&gpkg)? {
		log::info!("created tile set '{}'", tile_set.table_name);
	}
	Ok(())
}

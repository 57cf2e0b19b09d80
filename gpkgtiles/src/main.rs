mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Create a GeoPackage, optionally laid out by a YAML config
	Create(tools::create::Subcommand),

	/// Check a GeoPackage against the conformance requirements
	Verify(tools::verify::Subcommand),

	/// Show the tile sets of a GeoPackage
	Info(tools::info::Subcommand),

	/// Store one image file as a tile
	Import(tools::import::Subcommand),

	/// Write the tiles of a tile set into a directory
	Export(tools::export::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Create(arguments) => tools::create::run(arguments),
		Commands::Verify(arguments) => tools::verify::run(arguments),
		Commands::Info(arguments) => tools::info::run(arguments),
		Commands::Import(arguments) => tools::import::run(arguments),
		Commands::Export(arguments) => tools::export::run(arguments),
	}
}

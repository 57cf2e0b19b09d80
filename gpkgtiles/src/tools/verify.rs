use anyhow::Result;
use gpkgtiles::{
	container::{GeoPackage, OpenMode, VerificationLevel},
	core::{ConformanceError, GpkgError, Severity},
};
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// GeoPackage file to check
	#[arg()]
	filename: PathBuf,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("verify {:?}", arguments.filename);

	let gpkg = GeoPackage::builder()
		.mode(OpenMode::OpenExisting)
		.verification(VerificationLevel::None)
		.open(&arguments.filename)?;
	let issues = gpkg.verify()?;

	if issues.iter().any(|issue| issue.severity() == Severity::Error) {
		return Err(GpkgError::Conformance(ConformanceError::new(issues)).into());
	}
	for issue in &issues {
		println!("{issue}");
	}
	println!("{} conforms ({} warnings)", arguments.filename.display(), issues.len());
	Ok(())
}

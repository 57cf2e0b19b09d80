//! The entry point for working with a GeoPackage file.

use crate::{
	GeoPackageCore, GeoPackageTiles, VerificationLevel,
	storage::{OpenMode, StorageHandle},
	verification::ConformanceVerifier,
};
use anyhow::Result;
use gpkgtiles_core::{ConformanceError, GpkgError, Severity, VerificationIssue};
use gpkgtiles_derive::context;
use std::path::Path;

/// An open GeoPackage.
///
/// Opening a file runs the conformance battery (unless disabled through
/// [`GeoPackageBuilder::verification`]): issues with [`Severity::Error`] make opening fail with
/// [`GpkgError::Conformance`], warnings are logged. The file is released when the value is
/// dropped.
///
/// ```no_run
/// use gpkgtiles_container::GeoPackage;
/// use gpkgtiles_core::BoundingBox;
///
/// let gpkg = GeoPackage::create("ortho.gpkg".as_ref()).unwrap();
/// let srs = gpkg.core().get_spatial_reference_system(4326).unwrap().unwrap();
/// let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0).unwrap();
/// let tile_set = gpkg.tiles().add_tile_set("ortho", "Ortho", "", &bbox, &srs).unwrap();
/// ```
#[derive(Debug)]
pub struct GeoPackage {
	handle: StorageHandle,
}

impl GeoPackage {
	/// Creates a new GeoPackage. Fails if the file exists.
	pub fn create(path: &Path) -> Result<GeoPackage> {
		GeoPackage::builder().mode(OpenMode::CreateNew).open(path)
	}

	/// Opens an existing GeoPackage. Fails if the file is missing or does not conform.
	pub fn open(path: &Path) -> Result<GeoPackage> {
		GeoPackage::builder().mode(OpenMode::OpenExisting).open(path)
	}

	#[must_use]
	pub fn builder() -> GeoPackageBuilder {
		GeoPackageBuilder::default()
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		self.handle.path()
	}

	/// Low level access to the underlying database.
	#[must_use]
	pub fn handle(&self) -> &StorageHandle {
		&self.handle
	}

	#[must_use]
	pub fn core(&self) -> GeoPackageCore<'_> {
		GeoPackageCore::new(&self.handle)
	}

	#[must_use]
	pub fn tiles(&self) -> GeoPackageTiles<'_> {
		GeoPackageTiles::new(&self.handle)
	}

	/// Runs the full conformance battery and returns every issue, warnings included.
	pub fn verify(&self) -> Result<Vec<VerificationIssue>> {
		ConformanceVerifier::new().verify(&self.handle, VerificationLevel::Full)
	}
}

/// Options for opening a [`GeoPackage`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoPackageBuilder {
	mode: OpenMode,
	verification: VerificationLevel,
}

impl GeoPackageBuilder {
	pub fn mode(mut self, mode: OpenMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn verification(mut self, verification: VerificationLevel) -> Self {
		self.verification = verification;
		self
	}

	/// Opens or creates the file as configured.
	///
	/// A file that is created here receives the core tables and default reference systems
	/// before it is verified.
	#[context("opening GeoPackage '{}'", path.display())]
	pub fn open(self, path: &Path) -> Result<GeoPackage> {
		let existed = path.exists();
		let handle = StorageHandle::open(path, self.mode)?;
		if !existed {
			log::debug!("create GeoPackage {path:?}");
			GeoPackageCore::new(&handle).create_default_tables()?;
		}

		let issues = ConformanceVerifier::new().verify(&handle, self.verification)?;
		if issues.iter().any(|issue| issue.severity() == Severity::Error) {
			return Err(GpkgError::Conformance(ConformanceError::new(issues)).into());
		}
		for issue in &issues {
			log::warn!("{issue}");
		}

		Ok(GeoPackage { handle })
	}
}

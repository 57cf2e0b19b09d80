//! Conformance verification of GeoPackage files.
//!
//! The [`ConformanceVerifier`] runs an ordered battery of numbered requirement checks against
//! a [`StorageHandle`]. Each failed requirement becomes a [`VerificationIssue`]; whether the
//! issues block opening the file is decided by the caller based on their severity.

mod core_requirements;
mod table_definition;
mod tiles_requirements;


use crate::storage::StorageHandle;
use anyhow::Result;
use gpkgtiles_core::{Requirement, VerificationIssue};
use gpkgtiles_derive::context;

/// How much checking happens when a container is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VerificationLevel {
	/// Run every requirement check.
	#[default]
	Full,
	/// Skip verification.
	None,
}

type CheckFn = fn(&StorageHandle) -> Result<Option<String>>;

/// A requirement together with the function testing it.
///
/// A check returns `Ok(None)` when the requirement is met or cannot be tested because a
/// prerequisite table is missing, and `Ok(Some(reason))` when it is violated.
#[derive(Clone, Copy)]
pub struct RequirementCheck {
	pub requirement: Requirement,
	check: CheckFn,
}

impl RequirementCheck {
	pub(crate) fn new(requirement: Requirement, check: CheckFn) -> Self {
		Self { requirement, check }
	}

	fn run(&self, handle: &StorageHandle) -> Option<VerificationIssue> {
		let reason = match (self.check)(handle) {
			Ok(None) => return None,
			Ok(Some(reason)) => reason,
			Err(err) => format!("the check could not be completed: {err:#}"),
		};
		log::debug!("requirement {} failed: {reason}", self.requirement.number);
		Some(VerificationIssue::new(self.requirement, reason))
	}
}

/// The ordered battery of requirement checks.
pub struct ConformanceVerifier {
	checks: Vec<RequirementCheck>,
}

impl ConformanceVerifier {
	/// All core and tiles requirements, sorted by requirement number.
	#[must_use]
	pub fn new() -> Self {
		let mut checks = core_requirements::checks();
		checks.extend(tiles_requirements::checks());
		checks.sort_by_key(|check| check.requirement.number);
		Self { checks }
	}

	pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
		self.checks.iter().map(|check| &check.requirement)
	}

	/// Runs the battery and returns every failed requirement in order.
	#[context("verifying '{}'", handle.path().display())]
	pub fn verify(&self, handle: &StorageHandle, level: VerificationLevel) -> Result<Vec<VerificationIssue>> {
		if level == VerificationLevel::None {
			log::debug!("skipping verification of {:?}", handle.path());
			return Ok(Vec::new());
		}
		log::debug!("verifying {:?} against {} requirements", handle.path(), self.checks.len());
		Ok(self.checks.iter().filter_map(|check| check.run(handle)).collect())
	}
}

impl Default for ConformanceVerifier {
	fn default() -> Self {
		Self::new()
	}
}

/// Shorthand for `ConformanceVerifier::new().verify(handle, level)`.
pub fn verify(handle: &StorageHandle, level: VerificationLevel) -> Result<Vec<VerificationIssue>> {
	ConformanceVerifier::new().verify(handle, level)
}

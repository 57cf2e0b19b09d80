//! Report types produced by conformance verification.

use itertools::Itertools;
use std::fmt::{self, Display};

/// Whether a failed requirement blocks opening the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	Warning,
	Error,
}

impl Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Severity::Warning => "Warning",
			Severity::Error => "Error",
		})
	}
}

/// A numbered structural requirement of the GeoPackage format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Requirement {
	pub number: u32,
	pub severity: Severity,
	pub text: &'static str,
}

impl Requirement {
	#[must_use]
	pub const fn new(number: u32, severity: Severity, text: &'static str) -> Self {
		Self { number, severity, text }
	}

	/// Short identifier such as `R10`.
	#[must_use]
	pub fn id(&self) -> String {
		format!("R{}", self.number)
	}
}

/// A requirement that was checked and not met.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationIssue {
	pub requirement: Requirement,
	pub reason: String,
}

impl VerificationIssue {
	pub fn new(requirement: Requirement, reason: impl Into<String>) -> Self {
		Self {
			requirement,
			reason: reason.into(),
		}
	}

	#[must_use]
	pub fn severity(&self) -> Severity {
		self.requirement.severity
	}
}

impl Display for VerificationIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"({}) Requirement {} \"{}\": {}",
			self.requirement.severity, self.requirement.number, self.requirement.text, self.reason
		)
	}
}

/// Aggregate failure raised when a container does not pass verification.
///
/// Carries every issue found (warnings included). The `Display` output is meant to be
/// printed verbatim: one line per failed requirement, sorted by requirement number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConformanceError {
	issues: Vec<VerificationIssue>,
}

impl ConformanceError {
	#[must_use]
	pub fn new(mut issues: Vec<VerificationIssue>) -> Self {
		issues.sort_by_key(|issue| issue.requirement.number);
		Self { issues }
	}

	#[must_use]
	pub fn issues(&self) -> &[VerificationIssue] {
		&self.issues
	}

	/// Returns `true` if at least one issue has [`Severity::Error`].
	#[must_use]
	pub fn has_errors(&self) -> bool {
		self.issues.iter().any(|issue| issue.severity() == Severity::Error)
	}
}

impl Display for ConformanceError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"GeoPackage failed to meet the following requirements:\n{}",
			self.issues.iter().join("\n")
		)
	}
}

impl std::error::Error for ConformanceError {}

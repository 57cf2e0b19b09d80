use crate::{CoordinateReferenceSystem, ensure_argument};
use anyhow::Result;

/// A row of the reference system registry (`gpkg_spatial_ref_sys`).
///
/// `srs_id` is the container-local key that other tables refer to; the
/// (`organization`, `organization_coordsys_id`) pair is the external identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpatialReferenceSystem {
	pub name: String,
	pub srs_id: i32,
	pub organization: String,
	pub organization_coordsys_id: i32,
	pub definition: String,
	pub description: Option<String>,
}

impl SpatialReferenceSystem {
	/// Creates a validated record. Name, organization and definition must not be empty.
	pub fn new(
		name: &str,
		srs_id: i32,
		organization: &str,
		organization_coordsys_id: i32,
		definition: &str,
		description: Option<&str>,
	) -> Result<Self> {
		ensure_argument!(!name.trim().is_empty(), "reference system name must not be empty");
		ensure_argument!(
			!organization.trim().is_empty(),
			"reference system organization must not be empty"
		);
		ensure_argument!(
			!definition.trim().is_empty(),
			"reference system definition must not be empty"
		);
		Ok(Self {
			name: name.to_string(),
			srs_id,
			organization: organization.to_string(),
			organization_coordsys_id,
			definition: definition.to_string(),
			description: description.map(str::to_string),
		})
	}

	/// The external identity as a [`CoordinateReferenceSystem`].
	#[must_use]
	pub fn crs(&self) -> CoordinateReferenceSystem {
		CoordinateReferenceSystem::new(&self.organization, self.organization_coordsys_id)
			.unwrap_or_else(|_| CoordinateReferenceSystem::epsg(self.organization_coordsys_id))
	}

	/// Returns `true` if both records name the same (organization, code) identity.
	#[must_use]
	pub fn same_identity(&self, other: &SpatialReferenceSystem) -> bool {
		self.organization.eq_ignore_ascii_case(&other.organization)
			&& self.organization_coordsys_id == other.organization_coordsys_id
	}

	/// Returns `true` if every field matches, with the organization compared case-insensitively.
	#[must_use]
	pub fn same_definition(&self, other: &SpatialReferenceSystem) -> bool {
		self.same_identity(other)
			&& self.name == other.name
			&& self.srs_id == other.srs_id
			&& self.definition == other.definition
			&& self.description == other.description
	}
}

//! The GeoPackage core: reference system registry and content registry.
//!
//! [`GeoPackageCore`] offers add-or-get semantics: registering a record that already exists
//! with identical values returns the stored record, registering a conflicting record fails
//! with an invalid-argument error. Every registration runs in a single transaction.

mod schema;
pub use schema::*;


use crate::storage::{StorageHandle, queries, set_application_id, set_user_version};
use anyhow::{Result, anyhow};
use gpkgtiles_core::{
	BoundingBox, Content, DataType, Identifier, SpatialReferenceSystem, Timestamp, bail_argument, ensure_argument,
};
use gpkgtiles_derive::context;
use r2d2_sqlite::rusqlite::{Connection, OptionalExtension, Row, params};

const SELECT_SRS: &str = "SELECT srs_name, srs_id, organization, organization_coordsys_id, definition, description
	FROM gpkg_spatial_ref_sys";

const SELECT_CONTENT: &str = "SELECT table_name, data_type, identifier, description, CAST(last_change AS TEXT),
	min_x, min_y, max_x, max_y, srs_id FROM gpkg_contents";

/// Reference system and content registries of one container.
#[derive(Clone, Copy, Debug)]
pub struct GeoPackageCore<'a> {
	handle: &'a StorageHandle,
}

impl<'a> GeoPackageCore<'a> {
	#[must_use]
	pub fn new(handle: &'a StorageHandle) -> Self {
		Self { handle }
	}

	/// Installs the registry tables and default reference systems and marks the file as a
	/// GeoPackage. Existing tables and rows are kept.
	#[context("creating GeoPackage core tables")]
	pub fn create_default_tables(&self) -> Result<()> {
		self.handle.with_transaction(|tx| create_default_tables(tx))
	}

	/// Registers a reference system, or returns the identical one already registered.
	///
	/// # Errors
	/// Fails with an invalid-argument error if name, organization or definition is empty,
	/// if the (organization, organization_coordsys_id) identity is registered with different
	/// values, or if `srs_id` is already used by another identity.
	#[context("adding reference system {}:{}", organization, organization_coordsys_id)]
	pub fn add_spatial_reference_system(
		&self,
		name: &str,
		srs_id: i32,
		organization: &str,
		organization_coordsys_id: i32,
		definition: &str,
		description: Option<&str>,
	) -> Result<SpatialReferenceSystem> {
		let srs = SpatialReferenceSystem::new(
			name,
			srs_id,
			organization,
			organization_coordsys_id,
			definition,
			description,
		)?;
		self.handle.with_transaction(|tx| add_spatial_reference_system(tx, &srs))
	}

	/// Looks up a reference system by its container-local id.
	pub fn get_spatial_reference_system(&self, srs_id: i32) -> Result<Option<SpatialReferenceSystem>> {
		spatial_reference_system(&*self.handle.connection()?, srs_id)
	}

	/// Looks up a reference system by its external identity, ignoring the case of `organization`.
	pub fn get_spatial_reference_system_by_org(
		&self,
		organization: &str,
		organization_coordsys_id: i32,
	) -> Result<Option<SpatialReferenceSystem>> {
		spatial_reference_system_by_org(&*self.handle.connection()?, organization, organization_coordsys_id)
	}

	/// All registered reference systems ordered by `srs_id`.
	pub fn get_spatial_reference_systems(&self) -> Result<Vec<SpatialReferenceSystem>> {
		let conn = self.handle.connection()?;
		let mut statement = conn.prepare(&format!("{SELECT_SRS} ORDER BY srs_id"))?;
		let rows = statement.query_map([], read_srs)?.collect::<Result<Vec<_>, _>>()?;
		Ok(rows)
	}

	/// Registers a content row for an existing table, or returns the identical one already
	/// registered (`last_change` is not compared).
	#[context("adding content '{}'", table_name)]
	pub fn add_content(
		&self,
		table_name: &str,
		data_type: &DataType,
		identifier: &str,
		description: &str,
		bounding_box: Option<&BoundingBox>,
		srs: Option<&SpatialReferenceSystem>,
	) -> Result<Content> {
		let table_name = Identifier::new(table_name)?;
		let content = NewContent {
			table_name: &table_name,
			data_type,
			identifier,
			description,
			bounding_box,
			srs,
		};
		self.handle.with_transaction(|tx| {
			ensure_argument!(
				queries::table_or_view_exists(tx, table_name.as_str())?,
				"table '{table_name}' does not exist"
			);
			add_content(tx, &content)
		})
	}

	pub fn get_content(&self, table_name: &str) -> Result<Option<Content>> {
		content(&*self.handle.connection()?, table_name)
	}

	/// All content rows, optionally restricted to one data type, ordered by table name.
	pub fn get_contents(&self, data_type: Option<&DataType>) -> Result<Vec<Content>> {
		contents(&*self.handle.connection()?, data_type)
	}

	pub fn content_exists(&self, table_name: &str) -> Result<bool> {
		Ok(self.get_content(table_name)?.is_some())
	}

	/// Number of rows in the table behind `content`.
	#[context("counting rows of '{}'", content.table_name)]
	pub fn get_row_count(&self, content: &Content) -> Result<u64> {
		queries::row_count(&*self.handle.connection()?, &content.table_name)
	}
}

pub(crate) fn create_default_tables(conn: &Connection) -> Result<()> {
	log::debug!("create GeoPackage core tables");
	conn.execute_batch(CREATE_SPATIAL_REF_SYS)?;
	conn.execute_batch(CREATE_CONTENTS)?;
	for srs in default_reference_systems() {
		add_spatial_reference_system(conn, &srs)?;
	}
	set_application_id(conn, GEOPACKAGE_APPLICATION_ID)?;
	set_user_version(conn, GEOPACKAGE_USER_VERSION)?;
	Ok(())
}

fn read_srs(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<SpatialReferenceSystem> {
	Ok(SpatialReferenceSystem {
		name: row.get(0)?,
		srs_id: row.get(1)?,
		organization: row.get(2)?,
		organization_coordsys_id: row.get(3)?,
		definition: row.get(4)?,
		description: row.get(5)?,
	})
}

pub(crate) fn spatial_reference_system(conn: &Connection, srs_id: i32) -> Result<Option<SpatialReferenceSystem>> {
	let sql = format!("{SELECT_SRS} WHERE srs_id = ?1");
	Ok(conn.query_row(&sql, params![srs_id], read_srs).optional()?)
}

pub(crate) fn spatial_reference_system_by_org(
	conn: &Connection,
	organization: &str,
	organization_coordsys_id: i32,
) -> Result<Option<SpatialReferenceSystem>> {
	let sql = format!("{SELECT_SRS} WHERE organization = ?1 COLLATE NOCASE AND organization_coordsys_id = ?2");
	Ok(conn
		.query_row(&sql, params![organization, organization_coordsys_id], read_srs)
		.optional()?)
}

pub(crate) fn add_spatial_reference_system(
	conn: &Connection,
	srs: &SpatialReferenceSystem,
) -> Result<SpatialReferenceSystem> {
	if let Some(existing) = spatial_reference_system_by_org(conn, &srs.organization, srs.organization_coordsys_id)? {
		if existing.same_definition(srs) {
			return Ok(existing);
		}
		bail_argument!(
			"reference system {}:{} is already registered with different values (srs_id {}, name '{}')",
			existing.organization,
			existing.organization_coordsys_id,
			existing.srs_id,
			existing.name
		);
	}
	if let Some(existing) = spatial_reference_system(conn, srs.srs_id)? {
		bail_argument!(
			"srs_id {} is already used by reference system {}:{}",
			srs.srs_id,
			existing.organization,
			existing.organization_coordsys_id
		);
	}

	log::debug!("add reference system {}:{} as srs_id {}", srs.organization, srs.organization_coordsys_id, srs.srs_id);
	conn.execute(
		"INSERT INTO gpkg_spatial_ref_sys (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
		params![
			srs.name,
			srs.srs_id,
			srs.organization,
			srs.organization_coordsys_id,
			srs.definition,
			srs.description
		],
	)?;
	spatial_reference_system(conn, srs.srs_id)?
		.ok_or_else(|| anyhow!("reference system {} vanished after insert", srs.srs_id))
}

type ContentColumns = (
	String,
	String,
	Option<String>,
	Option<String>,
	String,
	Option<f64>,
	Option<f64>,
	Option<f64>,
	Option<f64>,
	Option<i32>,
);

fn read_content_columns(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<ContentColumns> {
	Ok((
		row.get(0)?,
		row.get(1)?,
		row.get(2)?,
		row.get(3)?,
		row.get(4)?,
		row.get(5)?,
		row.get(6)?,
		row.get(7)?,
		row.get(8)?,
		row.get(9)?,
	))
}

fn content_from_columns(columns: ContentColumns) -> Result<Content> {
	let (table_name, data_type, identifier, description, last_change, min_x, min_y, max_x, max_y, srs_id) = columns;
	Ok(Content {
		data_type: DataType::from(data_type.as_str()),
		identifier,
		description,
		last_change: Timestamp::parse(&last_change)?,
		bounding_box: BoundingBox::from_options(min_x, min_y, max_x, max_y)?,
		srs_id,
		table_name,
	})
}

pub(crate) fn content(conn: &Connection, table_name: &str) -> Result<Option<Content>> {
	let sql = format!("{SELECT_CONTENT} WHERE table_name = ?1 COLLATE NOCASE");
	conn.query_row(&sql, params![table_name], read_content_columns)
		.optional()?
		.map(content_from_columns)
		.transpose()
}

pub(crate) fn contents(conn: &Connection, data_type: Option<&DataType>) -> Result<Vec<Content>> {
	let rows = match data_type {
		Some(data_type) => {
			let mut statement = conn.prepare(&format!("{SELECT_CONTENT} WHERE data_type = ?1 ORDER BY table_name"))?;
			statement
				.query_map(params![data_type.as_str()], read_content_columns)?
				.collect::<Result<Vec<_>, _>>()?
		}
		None => {
			let mut statement = conn.prepare(&format!("{SELECT_CONTENT} ORDER BY table_name"))?;
			statement
				.query_map([], read_content_columns)?
				.collect::<Result<Vec<_>, _>>()?
		}
	};
	rows.into_iter().map(content_from_columns).collect()
}

/// Values of a content row to be registered.
pub(crate) struct NewContent<'a> {
	pub table_name: &'a Identifier,
	pub data_type: &'a DataType,
	pub identifier: &'a str,
	pub description: &'a str,
	pub bounding_box: Option<&'a BoundingBox>,
	pub srs: Option<&'a SpatialReferenceSystem>,
}

impl NewContent<'_> {
	pub(crate) fn matches(&self, content: &Content) -> bool {
		content.data_type == *self.data_type
			&& content.identifier.as_deref() == Some(self.identifier)
			&& content.description.as_deref().unwrap_or_default() == self.description
			&& content.bounding_box.as_ref() == self.bounding_box
			&& content.srs_id == self.srs.map(|srs| srs.srs_id)
	}
}

pub(crate) fn add_content(conn: &Connection, new: &NewContent<'_>) -> Result<Content> {
	let table_name = new.table_name.as_str();
	ensure_argument!(!new.identifier.trim().is_empty(), "identifier must not be empty");

	if let Some(existing) = content(conn, table_name)? {
		ensure_argument!(
			new.matches(&existing),
			"content '{}' is already registered with different values",
			existing.table_name
		);
		return Ok(existing);
	}

	let taken: Option<String> = conn
		.query_row(
			"SELECT table_name FROM gpkg_contents WHERE identifier = ?1",
			params![new.identifier],
			|row| row.get(0),
		)
		.optional()?;
	if let Some(other) = taken {
		bail_argument!("identifier '{}' is already used by content '{other}'", new.identifier);
	}

	if let Some(srs) = new.srs {
		let registered = spatial_reference_system(conn, srs.srs_id)?;
		ensure_argument!(
			registered.as_ref().is_some_and(|registered| registered.same_definition(srs)),
			"reference system {} (srs_id {}) is not registered",
			srs.crs(),
			srs.srs_id
		);
	}

	log::debug!("add content '{table_name}' ({})", new.data_type);
	let bbox = new.bounding_box.map(BoundingBox::as_array);
	conn.execute(
		"INSERT INTO gpkg_contents (table_name, data_type, identifier, description, last_change,
		min_x, min_y, max_x, max_y, srs_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
		params![
			table_name,
			new.data_type.as_str(),
			new.identifier,
			new.description,
			Timestamp::now().to_string(),
			bbox.map(|b| b[0]),
			bbox.map(|b| b[1]),
			bbox.map(|b| b[2]),
			bbox.map(|b| b[3]),
			new.srs.map(|srs| srs.srs_id),
		],
	)?;
	content(conn, table_name)?.ok_or_else(|| anyhow!("content '{table_name}' vanished after insert"))
}

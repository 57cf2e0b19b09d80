use super::{OpenMode, queries};
use anyhow::{Context, Result};
use gpkgtiles_core::GpkgError;
use gpkgtiles_derive::context;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{Connection, OptionalExtension, Params, Row, Transaction, TransactionBehavior},
};
use std::{
	fmt::{self, Debug},
	fs::File,
	io::Read,
	path::{Path, PathBuf},
};

/// Single writer model: one connection serves every statement.
const POOL_SIZE: u32 = 1;

/// Exclusive access to one SQLite container file.
///
/// Every connection handed out has foreign key enforcement switched on. Mutations that must
/// be atomic go through [`StorageHandle::with_transaction`].
pub struct StorageHandle {
	path: PathBuf,
	pool: Pool<SqliteConnectionManager>,
}

impl StorageHandle {
	/// Opens or creates the database at `path`.
	///
	/// # Errors
	/// Fails with [`GpkgError::FileState`] if `mode` does not match the state of the file or
	/// if the file is not a readable SQLite database.
	#[context("opening SQLite database '{}'", path.display())]
	pub fn open(path: &Path, mode: OpenMode) -> Result<StorageHandle> {
		log::debug!("open {path:?} ({mode:?})");

		mode
			.check(path.exists())
			.map_err(|reason| GpkgError::FileState(format!("{reason}: {}", path.display())))?;

		// Probe with a plain connection first, so that unreadable files fail fast instead of
		// running into the pool's connection timeout.
		probe(path).map_err(|e| GpkgError::FileState(format!("'{}' is not a readable database: {e}", path.display())))?;

		let manager =
			SqliteConnectionManager::file(path).with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
		let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;

		Ok(StorageHandle {
			path: path.to_path_buf(),
			pool,
		})
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Borrows the connection. It must be dropped before the next call on this handle.
	pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
		Ok(self.pool.get()?)
	}

	pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
		log::trace!("execute: {sql}");
		Ok(self.connection()?.execute(sql, params)?)
	}

	pub fn execute_batch(&self, sql: &str) -> Result<()> {
		log::trace!("execute batch: {sql}");
		Ok(self.connection()?.execute_batch(sql)?)
	}

	/// Runs a query expected to return at most one row.
	pub fn query_row<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Option<T>>
	where
		P: Params,
		F: FnOnce(&Row<'_>) -> r2d2_sqlite::rusqlite::Result<T>,
	{
		log::trace!("query row: {sql}");
		Ok(self.connection()?.query_row(sql, params, f).optional()?)
	}

	/// Runs a query and collects all mapped rows.
	pub fn query_map<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
	where
		P: Params,
		F: FnMut(&Row<'_>) -> r2d2_sqlite::rusqlite::Result<T>,
	{
		log::trace!("query map: {sql}");
		let conn = self.connection()?;
		let mut statement = conn.prepare(sql)?;
		let rows = statement.query_map(params, f)?.collect::<Result<Vec<T>, _>>()?;
		Ok(rows)
	}

	/// Runs `body` inside an immediate transaction.
	///
	/// The transaction is committed when `body` returns `Ok` and rolled back otherwise; the
	/// error from `body` is returned unchanged.
	pub fn with_transaction<T, F>(&self, body: F) -> Result<T>
	where
		F: FnOnce(&Transaction<'_>) -> Result<T>,
	{
		let mut conn = self.connection()?;
		let transaction = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
		match body(&transaction) {
			Ok(value) => {
				transaction.commit().context("committing transaction")?;
				Ok(value)
			}
			Err(err) => {
				if let Err(rollback) = transaction.rollback() {
					log::warn!("rolling back transaction failed: {rollback}");
				}
				Err(err)
			}
		}
	}

	/// Returns `true` if a table with that name exists.
	pub fn table_exists(&self, name: &str) -> Result<bool> {
		queries::table_exists(&*self.connection()?, name)
	}

	/// Returns `true` if a table or a view with that name exists.
	pub fn table_or_view_exists(&self, name: &str) -> Result<bool> {
		queries::table_or_view_exists(&*self.connection()?, name)
	}

	/// Column layout of a table as reported by `PRAGMA table_info`.
	pub fn column_info(&self, table: &str) -> Result<Vec<queries::ColumnInfo>> {
		queries::column_info(&*self.connection()?, table)
	}

	pub fn application_id(&self) -> Result<u32> {
		let value: i64 = self
			.connection()?
			.query_row("PRAGMA application_id", [], |row| row.get(0))?;
		// stored as a signed 32 bit integer
		Ok(value as i32 as u32)
	}

	pub fn set_application_id(&self, application_id: u32) -> Result<()> {
		set_application_id(&*self.connection()?, application_id)
	}

	pub fn user_version(&self) -> Result<u32> {
		let value: i64 = self
			.connection()?
			.query_row("PRAGMA user_version", [], |row| row.get(0))?;
		Ok(value as i32 as u32)
	}

	pub fn set_user_version(&self, user_version: u32) -> Result<()> {
		set_user_version(&*self.connection()?, user_version)
	}

	/// Version string of the linked SQLite library.
	#[must_use]
	pub fn sqlite_version() -> &'static str {
		r2d2_sqlite::rusqlite::version()
	}

	/// The first 16 bytes of the file, which hold the SQLite header string.
	#[context("reading header of '{}'", self.path.display())]
	pub fn page_header(&self) -> Result<Vec<u8>> {
		let mut header = Vec::with_capacity(16);
		File::open(&self.path)?.take(16).read_to_end(&mut header)?;
		Ok(header)
	}
}

pub(crate) fn set_application_id(conn: &Connection, application_id: u32) -> Result<()> {
	conn.execute_batch(&format!("PRAGMA application_id = {};", application_id as i32))?;
	Ok(())
}

pub(crate) fn set_user_version(conn: &Connection, user_version: u32) -> Result<()> {
	conn.execute_batch(&format!("PRAGMA user_version = {};", user_version as i32))?;
	Ok(())
}

fn probe(path: &Path) -> r2d2_sqlite::rusqlite::Result<()> {
	let conn = Connection::open(path)?;
	conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
	Ok(())
}

impl Debug for StorageHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StorageHandle").field("path", &self.path).finish()
	}
}

//! Catalog queries that work on a borrowed connection, so they can run inside a transaction.

use anyhow::Result;
use gpkgtiles_core::quote_identifier;
use r2d2_sqlite::rusqlite::{Connection, OptionalExtension, params};

/// One row of `PRAGMA table_info`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
	pub name: String,
	pub sql_type: String,
	pub not_null: bool,
	/// Position in the primary key, starting at 1, or 0 if not part of it.
	pub primary_key: u32,
}

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
	exists_in_schema(conn, name, "AND type = 'table'")
}

pub fn table_or_view_exists(conn: &Connection, name: &str) -> Result<bool> {
	exists_in_schema(conn, name, "AND type IN ('table', 'view')")
}

fn exists_in_schema(conn: &Connection, name: &str, filter: &str) -> Result<bool> {
	let sql = format!("SELECT 1 FROM sqlite_master WHERE name = ?1 COLLATE NOCASE {filter} LIMIT 1");
	let found = conn
		.query_row(&sql, params![name], |_| Ok(()))
		.optional()?
		.is_some();
	Ok(found)
}

pub fn column_info(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
	let sql = format!("PRAGMA table_info({})", quote_identifier(table));
	let mut statement = conn.prepare(&sql)?;
	let columns = statement
		.query_map([], |row| {
			Ok(ColumnInfo {
				name: row.get(1)?,
				sql_type: row.get(2)?,
				not_null: row.get::<_, i64>(3)? != 0,
				primary_key: row.get(5)?,
			})
		})?
		.collect::<Result<Vec<_>, _>>()?;
	Ok(columns)
}

/// Number of rows in a table whose name was read from the catalog.
pub fn row_count(conn: &Connection, table: &str) -> Result<u64> {
	let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
	let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
	Ok(count as u64)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn connection() -> Connection {
		let conn = Connection::open_in_memory().unwrap();
		conn.execute_batch(
			"CREATE TABLE tiles (id INTEGER PRIMARY KEY AUTOINCREMENT, zoom_level INTEGER NOT NULL, tile_data BLOB);
			CREATE VIEW tiles_view AS SELECT * FROM tiles;
			INSERT INTO tiles (zoom_level) VALUES (0), (1);",
		)
		.unwrap();
		conn
	}

	#[test]
	fn existence() {
		let conn = connection();
		assert!(table_exists(&conn, "tiles").unwrap());
		assert!(table_exists(&conn, "TILES").unwrap());
		assert!(!table_exists(&conn, "tiles_view").unwrap());
		assert!(table_or_view_exists(&conn, "tiles_view").unwrap());
		assert!(!table_or_view_exists(&conn, "missing").unwrap());
	}

	#[test]
	fn columns() {
		let conn = connection();
		let columns = column_info(&conn, "tiles").unwrap();
		assert_eq!(columns.len(), 3);
		assert_eq!(
			columns[0],
			ColumnInfo {
				name: "id".into(),
				sql_type: "INTEGER".into(),
				not_null: false,
				primary_key: 1
			}
		);
		assert!(columns[1].not_null);
		assert_eq!(columns[2].sql_type, "BLOB");
		assert!(column_info(&conn, "missing").unwrap().is_empty());
	}

	#[test]
	fn counting() {
		let conn = connection();
		assert_eq!(row_count(&conn, "tiles").unwrap(), 2);
		assert!(row_count(&conn, "missing").is_err());
	}
}

use crate::storage::StorageHandle;
use anyhow::Result;
use gpkgtiles_core::{Tile, TileData, quote_identifier};
use r2d2_sqlite::rusqlite::{Row, params};
use std::collections::VecDeque;

const DEFAULT_PAGE_SIZE: u32 = 256;

pub(crate) fn read_tile(row: &Row<'_>) -> r2d2_sqlite::rusqlite::Result<Tile> {
	Ok(Tile {
		id: row.get(0)?,
		zoom_level: row.get(1)?,
		column: row.get(2)?,
		row: row.get(3)?,
		data: TileData::from(row.get::<_, Vec<u8>>(4)?),
	})
}

/// Lazily walks the tiles of one tile set in ascending `id` order.
///
/// Rows are fetched in pages; the connection is only held while a page is loaded, so other
/// calls on the same container may be interleaved with iteration. After an error the iterator
/// is exhausted.
pub struct TileIterator<'a> {
	handle: &'a StorageHandle,
	sql: String,
	zoom: Option<u32>,
	page_size: u32,
	last_id: i64,
	buffer: VecDeque<Tile>,
	exhausted: bool,
}

impl<'a> TileIterator<'a> {
	pub(crate) fn new(handle: &'a StorageHandle, table_name: &str, zoom: Option<u32>) -> Self {
		let sql = format!(
			"SELECT id, zoom_level, tile_column, tile_row, tile_data FROM {}
			WHERE id > ?1 AND (?2 IS NULL OR zoom_level = ?2) ORDER BY id LIMIT ?3",
			quote_identifier(table_name)
		);
		Self {
			handle,
			sql,
			zoom,
			page_size: DEFAULT_PAGE_SIZE,
			last_id: i64::MIN,
			buffer: VecDeque::new(),
			exhausted: false,
		}
	}

	/// Number of rows fetched per query.
	#[must_use]
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size.max(1);
		self
	}

	fn fetch_page(&mut self) -> Result<()> {
		log::trace!("fetch tiles after id {}", self.last_id);
		let page = self
			.handle
			.query_map(&self.sql, params![self.last_id, self.zoom, self.page_size], read_tile)?;
		if (page.len() as u64) < u64::from(self.page_size) {
			self.exhausted = true;
		}
		if let Some(last) = page.last() {
			self.last_id = last.id;
		}
		self.buffer.extend(page);
		Ok(())
	}
}

impl Iterator for TileIterator<'_> {
	type Item = Result<Tile>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.buffer.is_empty() && !self.exhausted {
			if let Err(err) = self.fetch_page() {
				self.exhausted = true;
				return Some(Err(err));
			}
		}
		self.buffer.pop_front().map(Ok)
	}
}

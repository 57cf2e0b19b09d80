use super::{ImageSinkWriter, extension_for_mime_type};
use anyhow::{Context, Result, ensure};
use std::{
	fs,
	path::{Path, PathBuf},
};

/// Writes tiles as files: `<root>/<zoom>/<column>/<row>.<extension>`.
///
/// Rows are written as stored, counted from the top.
#[derive(Clone, Debug)]
pub struct DirectoryImageSink {
	root: PathBuf,
	written: u64,
}

impl DirectoryImageSink {
	/// Creates the root directory if it does not exist.
	pub fn new(root: &Path) -> Result<Self> {
		if root.exists() {
			ensure!(root.is_dir(), "'{}' is not a directory", root.display());
		} else {
			fs::create_dir_all(root).with_context(|| format!("creating directory '{}'", root.display()))?;
		}
		Ok(Self {
			root: root.to_path_buf(),
			written: 0,
		})
	}

	/// Path of the file a tile is written to.
	pub fn tile_path(&self, zoom_level: u32, column: u32, row: u32, mime_type: &str) -> PathBuf {
		self
			.root
			.join(zoom_level.to_string())
			.join(column.to_string())
			.join(format!("{row}.{}", extension_for_mime_type(mime_type)))
	}

	/// Number of tiles written so far.
	pub fn written(&self) -> u64 {
		self.written
	}
}

impl ImageSinkWriter for DirectoryImageSink {
	fn write(&mut self, zoom_level: u32, column: u32, row: u32, data: &[u8], mime_type: &str) -> Result<()> {
		let path = self.tile_path(zoom_level, column, row, mime_type);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		fs::write(&path, data).with_context(|| format!("writing tile '{}'", path.display()))?;
		self.written += 1;
		Ok(())
	}
}

use super::ImageSourceReader;
use anyhow::{Context, Result};
use gpkgtiles_core::TileData;
use std::{
	fs,
	path::{Path, PathBuf},
};

const OCTET_STREAM: &str = "application/octet-stream";

/// Reads an image from a file.
///
/// The MIME type is guessed from the file extension. Files without a known extension are
/// identified by their leading bytes.
#[derive(Clone, Debug)]
pub struct FileImageSource {
	path: PathBuf,
}

impl FileImageSource {
	pub fn new(path: &Path) -> Self {
		Self {
			path: path.to_path_buf(),
		}
	}
}

impl ImageSourceReader for FileImageSource {
	fn read(&self) -> Result<(Vec<u8>, String)> {
		log::trace!("read image {:?}", self.path);
		let data = fs::read(&self.path).with_context(|| format!("reading image '{}'", self.path.display()))?;
		let guess = mime_guess::from_path(&self.path).first();
		let mime_type = match guess {
			Some(mime) if mime.essence_str() != OCTET_STREAM => mime.essence_str().to_string(),
			_ => TileData::from(data.as_slice())
				.sniff_mime_type()
				.unwrap_or(OCTET_STREAM)
				.to_string(),
		};
		Ok((data, mime_type))
	}
}

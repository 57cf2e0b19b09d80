//! Producers and consumers of tile images.
//!
//! The tile store treats images as opaque bytes with a MIME type hint. Decoding and encoding
//! happen outside of this crate; these traits only move bytes in and out.

mod directory;
pub use directory::*;

mod file;
pub use file::*;

use anyhow::Result;

/// Produces the bytes of one image together with its MIME type.
pub trait ImageSourceReader {
	fn read(&self) -> Result<(Vec<u8>, String)>;
}

/// Consumes tile images addressed by zoom level, column and row.
pub trait ImageSinkWriter {
	fn write(&mut self, zoom_level: u32, column: u32, row: u32, data: &[u8], mime_type: &str) -> Result<()>;
}

/// Usual file extension for an image MIME type.
pub fn extension_for_mime_type(mime_type: &str) -> &'static str {
	match mime_type {
		"image/png" => "png",
		"image/jpeg" => "jpg",
		"image/webp" => "webp",
		"image/gif" => "gif",
		"image/tiff" => "tif",
		_ => "bin",
	}
}

//! Opaque tile payloads.
//!
//! The store never decodes tile images. [`TileData`] only knows its bytes and can guess a MIME
//! type from well-known magic numbers, which is enough to pick a file extension on export.

use std::fmt::{self, Debug};

/// Encoded image bytes of a single tile.
///
/// ```
/// use gpkgtiles_core::TileData;
///
/// let data = TileData::from(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
/// assert_eq!(data.len(), 8);
/// assert_eq!(data.sniff_mime_type(), Some("image/png"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TileData(Vec<u8>);

impl TileData {
	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Guesses the image format from the first bytes.
	#[must_use]
	pub fn sniff_mime_type(&self) -> Option<&'static str> {
		let bytes = self.as_slice();
		if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
			Some("image/png")
		} else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
			Some("image/jpeg")
		} else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
			Some("image/webp")
		} else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
			Some("image/gif")
		} else {
			None
		}
	}
}

impl From<Vec<u8>> for TileData {
	fn from(value: Vec<u8>) -> Self {
		TileData(value)
	}
}

impl From<&[u8]> for TileData {
	fn from(value: &[u8]) -> Self {
		TileData(value.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for TileData {
	fn from(value: &[u8; N]) -> Self {
		TileData(value.to_vec())
	}
}

impl From<&str> for TileData {
	fn from(value: &str) -> Self {
		TileData(value.as_bytes().to_vec())
	}
}

impl Debug for TileData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileData({} bytes)", self.0.len())
	}
}

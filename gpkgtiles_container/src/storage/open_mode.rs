/// How [`StorageHandle::open`](super::StorageHandle::open) treats the path it is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OpenMode {
	/// The file must not exist yet.
	CreateNew,
	/// The file must exist.
	OpenExisting,
	/// Open the file if it exists, create it otherwise.
	#[default]
	OpenOrCreate,
}

impl OpenMode {
	/// Checks the mode against the current state of the file system.
	pub(crate) fn check(self, exists: bool) -> Result<(), String> {
		match (self, exists) {
			(OpenMode::CreateNew, true) => Err(String::from("file already exists")),
			(OpenMode::OpenExisting, false) => Err(String::from("file does not exist")),
			_ => Ok(()),
		}
	}
}

use anyhow::{Result, bail, ensure};
use gpkgtiles_derive::context;

#[context("checking zoom level {zoom}")]
fn check_zoom(zoom: i64) -> Result<u32> {
	ensure!(zoom >= 0, "zoom level ({zoom}) must not be negative");
	Ok(zoom as u32)
}

#[context("consuming {} bytes", len)]
fn consume(data: Vec<u8>, len: usize) -> Result<Vec<u8>> {
	if data.is_empty() {
		bail!("no data");
	}
	Ok(data)
}

struct Store {
	name: String,
}

impl Store {
	#[context("reading from '{}'", self.name)]
	fn read(&self, fail: bool) -> Result<String> {
		if fail {
			bail!("read failed");
		}
		Ok(self.name.clone())
	}
}

#[test]
fn passes_values_through() {
	assert_eq!(check_zoom(3).unwrap(), 3);
	assert_eq!(consume(vec![1, 2], 2).unwrap(), vec![1, 2]);
}

#[test]
fn attaches_context_to_errors() {
	let err = check_zoom(-1).unwrap_err();
	assert_eq!(err.to_string(), "checking zoom level -1");
	assert_eq!(
		format!("{err:#}"),
		"checking zoom level -1: zoom level (-1) must not be negative"
	);
}

#[test]
fn body_may_consume_arguments() {
	let err = consume(Vec::new(), 0).unwrap_err();
	assert_eq!(format!("{err:#}"), "consuming 0 bytes: no data");
}

#[test]
fn works_on_methods() {
	let store = Store {
		name: String::from("tiles.gpkg"),
	};
	assert_eq!(store.read(false).unwrap(), "tiles.gpkg");
	assert_eq!(
		format!("{:#}", store.read(true).unwrap_err()),
		"reading from 'tiles.gpkg': read failed"
	);
}

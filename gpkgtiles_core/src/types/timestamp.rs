use crate::invalid_argument;
use anyhow::Result;
use std::fmt::{self, Display};
use time::{OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

const FORMAT_MILLIS: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");
const FORMAT_SECONDS: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// A UTC instant with millisecond precision, as stored in `gpkg_contents.last_change`.
///
/// Text form is `YYYY-MM-DDTHH:MM:SS.SSSZ`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
	/// The current time, truncated to milliseconds.
	#[must_use]
	pub fn now() -> Timestamp {
		let now = OffsetDateTime::now_utc();
		Timestamp(now.replace_millisecond(now.millisecond()).unwrap_or(now))
	}

	/// Parses `YYYY-MM-DDTHH:MM:SS.SSSZ`; the fractional part may be omitted.
	pub fn parse(text: &str) -> Result<Timestamp> {
		let parsed = PrimitiveDateTime::parse(text, FORMAT_MILLIS)
			.or_else(|_| PrimitiveDateTime::parse(text, FORMAT_SECONDS))
			.map_err(|e| invalid_argument!("timestamp '{text}' is not in the format YYYY-MM-DDTHH:MM:SS.SSSZ: {e}"))?;
		Ok(Timestamp(parsed.assume_utc()))
	}

	/// Returns `true` if `text` is a valid timestamp.
	#[must_use]
	pub fn is_valid(text: &str) -> bool {
		Self::parse(text).is_ok()
	}

	#[must_use]
	pub fn as_offset_date_time(&self) -> OffsetDateTime {
		self.0
	}
}

impl Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let t = self.0;
		write!(
			f,
			"{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
			t.year(),
			u8::from(t.month()),
			t.day(),
			t.hour(),
			t.minute(),
			t.second(),
			t.millisecond()
		)
	}
}

use time::{
	Date,
	format_description::BorrowedFormatItem,
	macros::format_description,
};

use crate::{Error, Result};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses the date part of a record or property value.
///
/// Quotes and a `^^datatype` suffix are dropped and only the first three `-` separated parts
/// are read, so `"1940-02-01"^^xsd:date` and `1940-02-01-1940-02-05` both give 1940-02-01.
pub fn parse_date(raw: &str) -> Result<Date> {
	let unquoted = raw.replace('"', "");
	let value = unquoted.split('^').next().unwrap_or_default().trim();
	let date_part = value.splitn(4, '-').take(3).collect::<Vec<_>>().join("-");

	Date::parse(&date_part, DATE_FORMAT).map_err(|_| Error::InvalidDate { value: raw.to_string() })
}

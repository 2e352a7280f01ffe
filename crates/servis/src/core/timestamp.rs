//! Date/time formats of service records
//!
//! Service documents store dates as `yyyy-MM-dd` and times as `HH:mm:ss`,
//! either as separate `datum`/`vreme` fields or combined in `datum_vreme`
//! with a single space between them. Tables show `dd.MM.yyyy.` and `HH:mm`.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{Result, ServisError};

/// Combined timestamp field of a service document
pub const COMBINED_FIELD: &str = "datum_vreme";
pub const DATE_FIELD: &str = "datum";
pub const TIME_FIELD: &str = "vreme";

pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";
pub const STORED_TIME_FORMAT: &str = "%H:%M:%S";
pub const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y.";
pub const DISPLAY_TIME_FORMAT: &str = "%H:%M";

/// Split a combined `datum_vreme` value into its date and time
pub fn split_timestamp(raw: &str) -> Result<(NaiveDate, NaiveTime)> {
    let malformed = || ServisError::MalformedTimestamp {
        value: raw.to_string(),
    };
    let (date, time) = raw.split_once(' ').ok_or_else(malformed)?;
    let date = NaiveDate::parse_from_str(date, STORED_DATE_FORMAT).map_err(|_| malformed())?;
    let time = NaiveTime::parse_from_str(time, STORED_TIME_FORMAT).map_err(|_| malformed())?;
    Ok((date, time))
}

/// Display texts (date, time) of a combined timestamp
pub fn display_timestamp(raw: &str) -> Result<(String, String)> {
    let (date, time) = split_timestamp(raw)?;
    Ok((
        date.format(DISPLAY_DATE_FORMAT).to_string(),
        time.format(DISPLAY_TIME_FORMAT).to_string(),
    ))
}

/// Reformat a stored date for display, leaving unparsable text untouched
pub fn display_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, STORED_DATE_FORMAT)
        .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Reformat a stored time for display, leaving unparsable text untouched
pub fn display_time(raw: &str) -> String {
    NaiveTime::parse_from_str(raw, STORED_TIME_FORMAT)
        .map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn format_stored_date(date: NaiveDate) -> String {
    date.format(STORED_DATE_FORMAT).to_string()
}

pub fn format_stored_time(time: NaiveTime) -> String {
    time.format(STORED_TIME_FORMAT).to_string()
}

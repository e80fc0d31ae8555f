
use chrono::{DateTime, NaiveDate, TimeZone};


/// This is the standard way of converting a date to a key of daily usage in tesseract.
pub fn date_to_day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Day key of the calendar date `moment` falls on in its own timezone.
pub fn day_key_of<Tz: TimeZone>(moment: &DateTime<Tz>) -> String {
    date_to_day_key(moment.date_naive())
}

/// Stamp used to give export files unique names, e.g. `20250316_142501`.
pub fn export_stamp<Tz: TimeZone>(moment: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    moment.format("%Y%m%d_%H%M%S").to_string()
}

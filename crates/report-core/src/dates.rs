//! File-name date extraction and display-date coercion.
//!
//! File names carry an optional 8-digit `DDMMYYYY` run; the extracted form
//! is the display string `DD-MM-YYYY`. The display string is later coerced
//! to a real [`NaiveDate`] for filtering and grouping, and values that do
//! not survive that coercion become `None` rather than errors.

use chrono::NaiveDate;
use regex::Regex;

use crate::models::UNKNOWN_DATE;

/// Display format for extracted dates.
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y";

/// Extract the first boundary-delimited 8-digit run from `file_name` and
/// format it as `DD-MM-YYYY`.
///
/// The split is purely positional: `(DD)(MM)(YYYY)` with no calendar
/// validation, so `99999999` yields `99-99-9999`. Runs longer than eight
/// digits do not match.
///
/// # Examples
///
/// ```
/// use report_core::dates::extract_date_from_file_name;
///
/// assert_eq!(
///     extract_date_from_file_name("jobs_15032024.csv"),
///     Some("15-03-2024".to_string())
/// );
/// assert_eq!(extract_date_from_file_name("jobs.csv"), None);
/// ```
pub fn extract_date_from_file_name(file_name: &str) -> Option<String> {
    let re = Regex::new(r"\b(\d{2})(\d{2})(\d{4})\b").expect("regex is valid");
    let caps = re.captures(file_name)?;
    Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

/// Extract the display date from a file name, falling back to the
/// [`UNKNOWN_DATE`] sentinel.
pub fn extracted_date_or_unknown(file_name: &str) -> String {
    extract_date_from_file_name(file_name).unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Coerce a `DD-MM-YYYY` display string to a [`NaiveDate`].
///
/// Unparseable values (the `"Unknown"` sentinel, calendar-invalid dates
/// such as `99-99-9999`, arbitrary garbage) coerce to `None`, never an
/// error. Date filtering depends on this: rows that coerce to `None` are
/// excluded from every date-range filter.
pub fn coerce_display_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DISPLAY_FORMAT).ok()
}

/// Format a coerced date back to its `DD-MM-YYYY` display form.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

//! Date parsing and formatting for date fields.
//!
//! Date fields carry a strftime-style pattern used for forms and display.
//! Parsing that input is lenient: it tries the field's own pattern, then the
//! default pattern, then RFC 3339. Stored documents use RFC 3339 only, which
//! keeps sub-second precision and never depends on the field's pattern.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Default pattern for date fields (`dd/MM/yyyy HH:mm:ss`).
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Formats a date with the given pattern.
///
/// An invalid pattern falls back to [`DEFAULT_DATE_FORMAT`] instead of
/// failing, matching the never-fail policy of rendering paths.
pub fn format_date(date: &DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_ok() {
        return out;
    }
    tracing::debug!(format, "invalid date format, using default");
    date.format(DEFAULT_DATE_FORMAT).to_string()
}

/// Parses a date using the given pattern, the default pattern, then RFC 3339.
///
/// Patterns without a time component are accepted and resolve to midnight UTC.
pub fn parse_date(text: &str, format: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    parse_with(text, format)
        .or_else(|| parse_with(text, DEFAULT_DATE_FORMAT))
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|d| d.with_timezone(&Utc))
        })
}

/// Formats a date for storage as RFC 3339 UTC with as many fractional digits
/// as the value needs.
pub fn format_stored_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses a date written by [`format_stored_date`].
pub fn parse_stored_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

fn parse_with(text: &str, format: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(text, format).ok()?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

//! Date formatting for entry date ranges.
//!
//! The editor stores months as `YYYY-MM` (or full `YYYY-MM-DD`). Anything else
//! is shown verbatim, so free-form values like "Summer 2019" still render.

use chrono::NaiveDate;

/// Parses `YYYY-MM` or `YYYY-MM-DD` into the first day of that month/day.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .ok()
}

/// "2021-03" → "Mar 2021"; unparseable input is returned trimmed.
pub fn format_date(raw: &str) -> String {
    match parse_month(raw) {
        Some(date) => date.format("%b %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Builds the right-aligned date label for an entry, or `None` when there is nothing to show.
pub fn date_range(start: Option<&str>, end: Option<&str>, current: bool) -> Option<String> {
    let start = start.map(str::trim).filter(|s| !s.is_empty()).map(format_date);
    let end = if current {
        Some("Present".to_string())
    } else {
        end.map(str::trim).filter(|s| !s.is_empty()).map(format_date)
    };

    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{s} - {e}")),
        (Some(s), None) => Some(s),
        (None, Some(e)) => Some(e),
        (None, None) => None,
    }
}

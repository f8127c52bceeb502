use std::cmp::Ordering;

use chrono::{Duration, NaiveDate, Utc};

use crate::types::ScheduleItem;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` request date. Missing or blank means today.
pub fn parse_request_date(date: Option<&str>) -> Result<NaiveDate, chrono::ParseError> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date_str) => NaiveDate::parse_from_str(date_str, DATE_FORMAT),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Every date from `from` to `to` inclusive, capped at `max_days` entries.
/// A `to` before `from` yields just `from`.
pub fn date_window(from: NaiveDate, to: NaiveDate, max_days: u32) -> Vec<NaiveDate> {
    let span = (to - from).num_days().max(0) + 1;
    let days = span.min(max_days.max(1) as i64);
    (0..days)
        .map_while(|i| from.checked_add_signed(Duration::days(i)))
        .collect()
}

/// Renders minutes since midnight as `HH:MM`.
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Lossy UTF-8 preview of a body limited to `max_chars` characters.
pub fn preview(body: &[u8], max_chars: usize) -> String {
    String::from_utf8_lossy(body).chars().take(max_chars).collect()
}

pub fn sort_schedule(items: &mut [ScheduleItem]) {
    items.sort_by(|a, b| match a.date.cmp(&b.date) {
        Ordering::Equal => a.time.cmp(&b.time),
        other => other,
    });
}

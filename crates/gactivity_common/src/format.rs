//! Formatting helpers shared by the collectors and the record store.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::TimeWindow;

/// Canonical timestamp layout stored in BigQuery and shown in the tables,
/// e.g. `2024-05-01T10:00:00.000Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Returns a preview of a list: `[a, b, ...]`, or an empty string for an empty list.
///
/// At most `limit` items are shown; `, ...` marks that items were dropped.
pub fn truncated<S: AsRef<str>>(items: &[S], limit: usize) -> String {
    if items.is_empty() {
        return String::new();
    }
    let contents = items
        .iter()
        .take(limit)
        .map(|item| item.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    let more = if items.len() > limit { ", ..." } else { "" };
    format!("[{}{}]", contents, more)
}

pub fn format_utc_millis(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses RFC 3339 (any offset, optional fraction) or a bare `yyyy-MM-dd` date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Rewrites a timestamp into [`TIMESTAMP_FORMAT`]; unparseable input is returned as is.
pub fn normalize_timestamp(value: &str) -> String {
    parse_timestamp(value)
        .map(format_utc_millis)
        .unwrap_or_else(|| value.to_string())
}

/// Converts BigQuery's int64 TIMESTAMP representation.
pub fn from_epoch_micros(micros: i64) -> Option<String> {
    DateTime::from_timestamp_micros(micros).map(format_utc_millis)
}

/// Duration between two timestamps as `"<minutes> minutes"`, e.g. `"60.0 minutes"`.
pub fn total_minutes(start: &str, end: &str) -> Option<String> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let minutes = (end - start).num_milliseconds() as f64 / 60_000.0;
    Some(format!("{:?} minutes", minutes))
}

/// First and last second of the month containing `now`, evaluated in `tz`.
pub fn month_window(now: DateTime<Utc>, tz: Tz) -> Option<TimeWindow> {
    let local = now.with_timezone(&tz).date_naive();
    let first = NaiveDate::from_ymd_opt(local.year(), local.month(), 1)?;
    let next_first = if local.month() == 12 {
        NaiveDate::from_ymd_opt(local.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(local.year(), local.month() + 1, 1)?
    };
    let last = next_first.pred_opt()?;

    let start = start_of_day(first, tz)?;
    let end = tz
        .from_local_datetime(&last.and_hms_opt(23, 59, 59)?)
        .latest()?;

    Some(TimeWindow::new(start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// From midnight `days` days before `now` (in `tz`) up to `now`.
pub fn lookback_window(now: DateTime<Utc>, days: i64, tz: Tz) -> Option<TimeWindow> {
    let local = now.with_timezone(&tz).date_naive();
    let first = local.checked_sub_days(chrono::Days::new(days.max(0) as u64))?;
    let start = start_of_day(first, tz)?;
    Some(TimeWindow::new(start.with_timezone(&Utc), now))
}

const MAX_DST_GAP_MINUTES: i64 = 180;

/// First existing instant of `date` in `tz`. Where midnight falls in a DST gap
/// (e.g. America/Santiago) this is the first minute after the gap.
fn start_of_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=MAX_DST_GAP_MINUTES).find_map(|minutes| {
        tz.from_local_datetime(&(midnight + chrono::Duration::minutes(minutes)))
            .earliest()
    })
}

/// Resolves a configured zone name, falling back to UTC.
pub fn parse_time_zone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!("Unknown time zone '{}', using UTC", name);
        Tz::UTC
    })
}

//! Date Normalizer for the forum's Russian-locale timestamps.
//!
//! Post headers carry either an absolute `dd.mm.yy, HH:MM` stamp or a relative
//! one ("Сегодня, 14:30", "Вчера, 09:00").

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

const TODAY_PREFIX: &str = "сегодня";
const YESTERDAY_PREFIX: &str = "вчера";

/// Date part of the forum's format, used when expanding relative prefixes.
const DATE_FORMAT: &str = "%d.%m.%y";
const DATE_TIME_FORMAT: &str = "%d.%m.%y, %H:%M";

/// Parse a forum date into a wall-clock time, resolving relative prefixes
/// against `today`.
#[must_use]
pub fn normalize_date(raw: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let lowered = raw.trim().to_lowercase();

    let expanded = if let Some(rest) = strip_relative(&lowered, TODAY_PREFIX) {
        format!("{}{rest}", today.format(DATE_FORMAT))
    } else if let Some(rest) = strip_relative(&lowered, YESTERDAY_PREFIX) {
        format!("{}{rest}", today.pred_opt()?.format(DATE_FORMAT))
    } else {
        lowered
    };

    NaiveDateTime::parse_from_str(&expanded, DATE_TIME_FORMAT).ok()
}

/// Parse a forum date in the server's local time zone.
///
/// Returns `None` for strings that do not match the forum format and for wall
/// clock times skipped by a DST transition.
#[must_use]
pub fn parse_forum_date(raw: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let naive = normalize_date(raw, now.date_naive())?;
    Local.from_local_datetime(&naive).earliest()
}

/// Strip `prefix` only when followed by the ", " separator, keeping the separator.
fn strip_relative<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    value
        .strip_prefix(prefix)
        .filter(|rest| rest.starts_with(", "))
}

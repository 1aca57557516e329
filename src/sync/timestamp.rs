//! Remote and local modification-time resolution, normalized to UTC.
//!
//! The remote side is two-tiered. The precise tier asks the server for the
//! file's mtime directly and gets a full UTC instant back. When that query
//! is unsupported or fails, the listing tier parses the long directory
//! listing, whose date column carries no year, no timezone, and only minute
//! precision. Each tier has exactly one normalization function here so the
//! ambiguity stays in one place.

use crate::remote::RemoteSession;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Utc};
use std::path::Path;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Resolves the remote file's last-modified instant, or `None` when the file
/// is absent or neither tier produced data. Transport failures inside a tier
/// are demoted to "no data from this tier", never to an operation failure.
pub fn resolve(session: &mut dyn RemoteSession, file_name: &str) -> Option<DateTime<Utc>> {
    match session.mod_time(file_name) {
        Ok(naive) => {
            // The mtime query already answers in UTC.
            let instant = naive.and_utc();
            tracing::debug!(file = file_name, %instant, "remote mtime from precise query");
            return Some(instant);
        }
        Err(err) => {
            tracing::debug!(file = file_name, error = %err, "precise mtime query unavailable, falling back to listing");
        }
    }

    let lines = match session.dir_list(Some(file_name)) {
        Ok(lines) => lines,
        Err(err) => {
            tracing::debug!(file = file_name, error = %err, "directory listing unavailable");
            return None;
        }
    };

    let now = Local::now().naive_local();
    for line in &lines {
        if let Some(naive) = parse_listing_line(line, now) {
            let instant = listing_naive_to_utc(naive);
            tracing::debug!(file = file_name, %instant, "remote mtime from directory listing");
            return Some(instant);
        }
    }

    tracing::debug!(file = file_name, "no usable date in directory listing");
    None
}

/// Local filesystem mtime as UTC; `None` when the file does not exist.
pub fn local_mtime(path: &Path) -> std::io::Result<Option<DateTime<Utc>>> {
    if !path.exists() {
        return Ok(None);
    }
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(Some(DateTime::<Utc>::from(modified)))
}

/// Parses the date column of one Unix-style listing line, e.g.
/// `-rw-r--r-- 1 u g 4096 Jan 09 14:32 GZ2E01.s01`.
///
/// Recent entries carry `HH:MM` with no year: assume the current year, and
/// subtract one when that would land in the future (a December file listed
/// in January). Entries older than the server's cutoff carry a year instead
/// of a time and resolve to midnight of that day.
pub fn parse_listing_line(line: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let month_at = tokens.iter().position(|t| MONTHS.contains(t))?;
    let month = tokens.get(month_at)?;
    let day = tokens.get(month_at + 1)?;
    let time_or_year = tokens.get(month_at + 2)?;

    if time_or_year.contains(':') {
        let stamp = format!("{} {} {} {}", now.year(), month, day, time_or_year);
        let mut parsed = NaiveDateTime::parse_from_str(&stamp, "%Y %b %d %H:%M").ok()?;
        if parsed > now {
            parsed = parsed.with_year(now.year() - 1)?;
        }
        Some(parsed)
    } else {
        let stamp = format!("{} {} {} 00:00", time_or_year, month, day);
        NaiveDateTime::parse_from_str(&stamp, "%Y %b %d %H:%M").ok()
    }
}

/// Listing times are emitted in the server's local clock with no offset.
/// The best available approximation is this machine's offset, which is only
/// exact when both sides share a timezone; a known limitation, kept rather
/// than guessed around.
pub fn listing_naive_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn parses_recent_entry_with_current_year() {
        let now = naive(2024, 6, 15, 12, 0);
        let parsed =
            parse_listing_line("-rw-r--r-- 1 ftp ftp 4096 Jan 09 14:32 GZ2E01.s01", now).unwrap();
        assert_eq!(parsed, naive(2024, 1, 9, 14, 32));
    }

    #[test]
    fn future_entry_resolves_to_previous_year() {
        // A December file listed in early January must not be "next December".
        let now = naive(2024, 1, 2, 8, 0);
        let parsed =
            parse_listing_line("-rw-r--r-- 1 ftp ftp 4096 Dec 30 22:10 GZ2E01.s01", now).unwrap();
        assert_eq!(parsed, naive(2023, 12, 30, 22, 10));
    }

    #[test]
    fn same_day_entry_keeps_current_year() {
        let now = naive(2024, 6, 15, 12, 0);
        let parsed =
            parse_listing_line("-rw-r--r-- 1 ftp ftp 4096 Jun 15 09:45 GZ2E01.s01", now).unwrap();
        assert_eq!(parsed, naive(2024, 6, 15, 9, 45));
    }

    #[test]
    fn old_entry_with_year_column_resolves_to_midnight() {
        let now = naive(2024, 6, 15, 12, 0);
        let parsed =
            parse_listing_line("-rw-r--r-- 1 ftp ftp 4096 Mar 03 2022 GZ2E01.s01", now).unwrap();
        assert_eq!(parsed, naive(2022, 3, 3, 0, 0));
    }

    #[test]
    fn handles_single_digit_day() {
        let now = naive(2024, 6, 15, 12, 0);
        let parsed =
            parse_listing_line("-rw-r--r-- 1 ftp ftp 4096 Jan 9 14:32 GZ2E01.s01", now).unwrap();
        assert_eq!(parsed, naive(2024, 1, 9, 14, 32));
    }

    #[test]
    fn rejects_line_without_date_column() {
        let now = naive(2024, 6, 15, 12, 0);
        assert!(parse_listing_line("total 12", now).is_none());
        assert!(parse_listing_line("", now).is_none());
        assert!(parse_listing_line("drwxr-xr-x 2 ftp ftp", now).is_none());
    }

    #[test]
    fn listing_precision_is_one_minute() {
        let now = naive(2024, 6, 15, 12, 0);
        let parsed =
            parse_listing_line("-rw-r--r-- 1 ftp ftp 4096 Jun 01 10:15 GZ2E01.s01", now).unwrap();
        assert_eq!(parsed.and_utc().timestamp() % 60, 0);
    }
}

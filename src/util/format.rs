//! Human-readable sizes and timestamps.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const SIZE_BASE: u64 = 1024;

/// Format a byte count in base-1024 units with at most two decimals.
///
/// Trailing zeros are dropped: `1536` is `"1.5 KB"`, `1024` is `"1 KB"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }
    let mut unit = 0;
    let mut divisor = 1_u64;
    while unit + 1 < SIZE_UNITS.len() && bytes / divisor >= SIZE_BASE {
        divisor *= SIZE_BASE;
        unit += 1;
    }
    let scaled = bytes as f64 / divisor as f64;
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

/// Current wall-clock time in the local offset, or UTC when the local offset
/// cannot be determined.
#[must_use]
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `HH:MM:SS`, as shown in front of every log line.
#[must_use]
pub fn clock_time(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

/// Render a service timestamp (`2024-03-09T14:05:07.123456`) as
/// `2024-03-09 14:05:07`. Unparseable input is returned unchanged.
#[must_use]
pub fn report_timestamp(raw: &str) -> String {
    let parsed = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]")));

    match parsed {
        Ok(at) => at
            .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
            .unwrap_or_else(|_| raw.to_owned()),
        Err(_) => raw.to_owned(),
    }
}

/// Filesystem-safe stamp for export names: ISO-8601 to the second, in UTC,
/// with `:` replaced by `-`.
#[must_use]
pub fn file_stamp(at: OffsetDateTime) -> String {
    at.to_offset(time::UtcOffset::UTC)
        .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
        .unwrap_or_default()
        .replace(':', "-")
}

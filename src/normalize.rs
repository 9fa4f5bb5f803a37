//! Derives hour, weekday and calendar-day buckets from raw timestamps, and
//! brings bill numbers to one canonical spelling.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::errors::NormalizationError;
use crate::transaction::{NormalizedLine, TransactionLine};

/// Date-time layouts tried in order when no explicit format is configured.
///
/// Dates without a leading year are read month-first. The day-first layouts
/// only match what month-first cannot, such as `25/03/2024`.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
];

fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

/// Parses a timestamp cell.
///
/// With `format` set, only that layout is tried (as a date-time, then as a
/// date). Otherwise RFC 3339 is tried first, keeping the wall-clock time,
/// followed by [`DATETIME_FORMATS`] and [`DATE_FORMATS`].
pub fn parse_timestamp(value: &str, format: Option<&str>) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(fmt) = format {
        return NaiveDateTime::parse_from_str(value, fmt)
            .ok()
            .or_else(|| NaiveDate::parse_from_str(value, fmt).ok().and_then(midnight));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(midnight)
        })
}

/// Parses a bill number as an integer, accepting integral decimals such as
/// `"100.0"` that spreadsheet exports produce.
pub fn parse_bill_number(bill_no: &str) -> Option<i64> {
    let trimmed = bill_no.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Spells integral bill numbers as plain integers (`"100.0"` -> `"100"`).
/// Anything else is kept as written, minus surrounding whitespace.
pub fn canonical_bill_no(bill_no: &str) -> String {
    match parse_bill_number(bill_no) {
        Some(n) => n.to_string(),
        None => bill_no.trim().to_string(),
    }
}

/// Normalizes a single line.
pub fn normalize_line(
    mut line: TransactionLine,
    format: Option<&str>,
) -> Result<NormalizedLine, NormalizationError> {
    line.bill_no = canonical_bill_no(&line.bill_no);
    let timestamp =
        parse_timestamp(&line.timestamp, format).ok_or_else(|| NormalizationError {
            row: line.row,
            value: line.timestamp.clone(),
        })?;

    Ok(NormalizedLine {
        hour: timestamp.hour(),
        weekday: timestamp.weekday(),
        date: timestamp.date(),
        timestamp,
        line,
    })
}

/// Normalizes every line, failing on the first unparseable timestamp.
#[tracing::instrument(skip(lines), fields(lines = lines.len()))]
pub fn normalize(
    lines: Vec<TransactionLine>,
    format: Option<&str>,
) -> Result<Vec<NormalizedLine>, NormalizationError> {
    let normalized = lines
        .into_iter()
        .map(|line| normalize_line(line, format))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(normalized = normalized.len(), "Timestamps normalized");
    Ok(normalized)
}

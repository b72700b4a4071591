//! Vendor timestamp normalization.
//!
//! Callback payloads carry timestamps in several layouts and never say which
//! one a field uses. `normalize` tries each accepted layout in a fixed order
//! and returns the first instant that parses.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// `2006-01-02 15:04:05.000000`
const SPACE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.6f";
/// `2006-01-02T15:04:05.000000`
const ISO_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
/// `Mon Jan 2 15:04:05 MST 2006`; the zone abbreviation is skipped.
const UNIX_DATE_LAYOUT: &str = "%a %b %d %H:%M:%S %Z %Y";

const FRACTION_DIGITS: usize = 6;

/// Returned when no accepted layout matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized timestamp format: {input:?}")]
pub struct TimeParseError {
    /// The original, unpadded input.
    pub input: String,
}

/// Parses a vendor timestamp into a UTC instant.
///
/// Zone-less layouts are read as UTC wall-clock time. Fractional seconds are
/// zero-padded to microseconds, so `.5` means 500000µs.
pub fn normalize(input: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let padded = pad_fraction(input);

    NaiveDateTime::parse_from_str(&padded, SPACE_LAYOUT)
        .or_else(|_| NaiveDateTime::parse_from_str(&padded, ISO_LAYOUT))
        .or_else(|_| parse_unix_date(input))
        .map(|naive| naive.and_utc())
        .map_err(|_| TimeParseError {
            input: input.to_string(),
        })
}

/// Converts Unix milliseconds into an instant.
pub fn from_unix_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

fn parse_unix_date(input: &str) -> chrono::ParseResult<NaiveDateTime> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, UNIX_DATE_LAYOUT)
}

/// Rewrites the first `.<digits>` run to exactly six digits, or appends
/// `.000000` when there is none. Digits past the sixth are dropped.
fn pad_fraction(input: &str) -> String {
    let bytes = input.as_bytes();
    let dot = bytes
        .windows(2)
        .position(|w| w[0] == b'.' && w[1].is_ascii_digit());

    let Some(dot) = dot else {
        return format!("{input}.000000");
    };

    let start = dot + 1;
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| start + n);
    let digits = &input[start..end];

    let mut out = String::with_capacity(input.len() + FRACTION_DIGITS);
    out.push_str(&input[..start]);
    if digits.len() >= FRACTION_DIGITS {
        out.push_str(&digits[..FRACTION_DIGITS]);
    } else {
        out.push_str(digits);
        out.extend(std::iter::repeat_n('0', FRACTION_DIGITS - digits.len()));
    }
    out.push_str(&input[end..]);
    out
}

//! Retention period values
//!
//! Retention periods are written in the Go duration syntax used by Seed
//! provider configurations (`96h`, `1h30m`, `1.5h`, `-48h`). The value is a
//! signed nanosecond count with the same range as Go's `time.Duration`, so
//! negative and zero periods survive parsing and are rejected later by shape
//! validation rather than by the parser.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Largest magnitude accepted while accumulating (|i64::MIN|)
const MAX_MAGNITUDE: u64 = 1 << 63;

/// Duration expression could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// Malformed expression or out-of-range value
    #[error("time: invalid duration \"{input}\"")]
    Invalid {
        /// The full expression as supplied
        input: String,
    },

    /// A number without a unit suffix, e.g. `"96"`
    #[error("time: missing unit in duration \"{input}\"")]
    MissingUnit {
        /// The full expression as supplied
        input: String,
    },

    /// A unit suffix that is not one of `ns us µs ms s m h`
    #[error("time: unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit {
        /// The unrecognised unit
        unit: String,
        /// The full expression as supplied
        input: String,
    },
}

/// Minimum time backups must be retained, as a signed nanosecond count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RetentionPeriod(i64);

impl RetentionPeriod {
    /// Zero-length period
    pub const ZERO: Self = Self(0);

    /// Build a period from a signed nanosecond count
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Build a period of whole hours, saturating at the representable range
    pub const fn from_hours(hours: i64) -> Self {
        Self(hours.saturating_mul(HOUR as i64))
    }

    /// Signed nanosecond count
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Whether the period is strictly greater than zero
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whole seconds, truncated toward zero
    pub const fn whole_seconds(self) -> i64 {
        self.0 / SECOND as i64
    }

    /// Whole seconds, rounded up so a positive period never becomes zero.
    /// Zero and negative periods map to zero.
    pub const fn ceil_seconds(self) -> i64 {
        if self.0 <= 0 {
            return 0;
        }
        let secs = self.0 / SECOND as i64;
        if self.0 % SECOND as i64 == 0 {
            secs
        } else {
            secs + 1
        }
    }
}

impl FromStr for RetentionPeriod {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_go_duration(s)
    }
}

impl fmt::Display for RetentionPeriod {
    /// Canonical Go rendering: `96h0m0s`, `1.5s`, `300ms`, `0s`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();

        if magnitude == 0 {
            return f.write_str("0s");
        }

        if magnitude < SECOND {
            let (unit, precision) = if magnitude < MICROSECOND {
                ("ns", 0)
            } else if magnitude < MILLISECOND {
                ("µs", 3)
            } else {
                ("ms", 6)
            };
            let (fraction, whole) = format_fraction(magnitude, precision);
            return write!(f, "{sign}{whole}{fraction}{unit}");
        }

        let (fraction, total_secs) = format_fraction(magnitude, 9);
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        if total_mins == 0 {
            return write!(f, "{sign}{secs}{fraction}s");
        }
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if hours == 0 {
            write!(f, "{sign}{mins}m{secs}{fraction}s")
        } else {
            write!(f, "{sign}{hours}h{mins}m{secs}{fraction}s")
        }
    }
}

/// Split off the lowest `precision` decimal digits as a fraction string with
/// trailing zeros dropped (empty when all zero), returning the remaining
/// integer part.
fn format_fraction(value: u64, precision: u32) -> (String, u64) {
    let mut rest = value;
    let mut digits = Vec::with_capacity(precision as usize);
    let mut significant = false;
    for _ in 0..precision {
        let digit = (rest % 10) as u8;
        significant = significant || digit != 0;
        if significant {
            digits.push(char::from(b'0' + digit));
        }
        rest /= 10;
    }
    if digits.is_empty() {
        return (String::new(), rest);
    }
    let fraction: String = std::iter::once('.').chain(digits.into_iter().rev()).collect();
    (fraction, rest)
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        // ASCII, micro sign (U+00B5) and Greek mu (U+03BC)
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

/// Consume leading ASCII digits. `None` on overflow past 2^63.
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let end = s
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len());
    let mut value: u64 = 0;
    for b in s[..end].bytes() {
        if value > MAX_MAGNITUDE / 10 {
            return None;
        }
        value = value * 10 + u64::from(b - b'0');
        if value > MAX_MAGNITUDE {
            return None;
        }
    }
    Some((value, &s[end..]))
}

/// Consume leading fraction digits, returning the digits as an integer and
/// the power of ten they were scaled by. Digits past the precision limit are
/// consumed but ignored.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let end = s
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(s.len());
    let mut value: u64 = 0;
    let mut scale = 1.0_f64;
    let mut overflow = false;
    for b in s[..end].bytes() {
        if overflow {
            continue;
        }
        if value > (MAX_MAGNITUDE - 1) / 10 {
            overflow = true;
            continue;
        }
        let next = value * 10 + u64::from(b - b'0');
        if next > MAX_MAGNITUDE {
            overflow = true;
            continue;
        }
        value = next;
        scale *= 10.0;
    }
    (value, scale, &s[end..])
}

/// Parse a Go duration expression such as `"96h"`, `"-1.5h"` or `"2h45m"`.
///
/// A bare `"0"` is accepted; any other number needs a unit.
pub fn parse_go_duration(input: &str) -> Result<RetentionPeriod, DurationError> {
    let invalid = || DurationError::Invalid {
        input: input.to_string(),
    };

    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    if s == "0" {
        return Ok(RetentionPeriod::ZERO);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let first = s.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, rest) = leading_int(s).ok_or_else(invalid)?;
        let has_whole = rest.len() != s.len();
        s = rest;

        let mut fraction = 0;
        let mut scale = 1.0;
        let mut has_fraction = false;
        if let Some(rest) = s.strip_prefix('.') {
            let (digits, digits_scale, remaining) = leading_fraction(rest);
            has_fraction = remaining.len() != rest.len();
            fraction = digits;
            scale = digits_scale;
            s = remaining;
        }
        // "." alone, or ".s"
        if !has_whole && !has_fraction {
            return Err(invalid());
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit {
                input: input.to_string(),
            });
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;

        let nanos_per_unit = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        if whole > MAX_MAGNITUDE / nanos_per_unit {
            return Err(invalid());
        }
        let mut value = whole * nanos_per_unit;
        if fraction > 0 {
            value += (fraction as f64 * (nanos_per_unit as f64 / scale)) as u64;
            if value > MAX_MAGNITUDE {
                return Err(invalid());
            }
        }

        total = total.checked_add(value).ok_or_else(invalid)?;
        if total > MAX_MAGNITUDE {
            return Err(invalid());
        }
    }

    if negative {
        return Ok(RetentionPeriod((-(i128::from(total))) as i64));
    }
    i64::try_from(total)
        .map(RetentionPeriod)
        .map_err(|_| invalid())
}

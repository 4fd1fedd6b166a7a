/*!
 * Timestamps for ASS documents.
 *
 * ASS encodes time as `H:MM:SS.cc`: unpadded hours, two-digit minutes and
 * seconds, two-digit centiseconds. Times are held as whole centiseconds so
 * parse/format cycles are exact and shifting never accumulates float error.
 */

use std::fmt;
use std::str::FromStr;

use crate::errors::CaptionError;

const CENTIS_PER_SECOND: u64 = 100;
const CENTIS_PER_MINUTE: u64 = 60 * CENTIS_PER_SECOND;
const CENTIS_PER_HOUR: u64 = 60 * CENTIS_PER_MINUTE;

/// Absorbs binary float error (0.29 * 100 == 28.999999999999996)
const TRUNCATION_TOLERANCE: f64 = 1e-6;

/// A non-negative point on a subtitle timeline, in centiseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssTime(u64);

impl AssTime {
    pub const ZERO: AssTime = AssTime(0);

    pub fn from_centis(centis: u64) -> Self {
        AssTime(centis)
    }

    /// Convert seconds to a timestamp, truncating below the centisecond.
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return AssTime::ZERO;
        }
        AssTime((seconds * CENTIS_PER_SECOND as f64 + TRUNCATION_TOLERANCE).floor() as u64)
    }

    pub fn centis(self) -> u64 {
        self.0
    }

    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / CENTIS_PER_SECOND as f64
    }

    /// Move by `delta_seconds` (rounded to the nearest centisecond), never below zero
    pub fn shifted(self, delta_seconds: f64) -> Self {
        let delta = seconds_to_centis_rounded(delta_seconds);
        if delta >= 0 {
            AssTime(self.0.saturating_add(delta.unsigned_abs()))
        } else {
            AssTime(self.0.saturating_sub(delta.unsigned_abs()))
        }
    }

    /// Offset by another timestamp
    pub fn offset_by(self, base: AssTime) -> Self {
        AssTime(self.0.saturating_add(base.0))
    }
}

fn seconds_to_centis_rounded(seconds: f64) -> i64 {
    if !seconds.is_finite() {
        return 0;
    }
    (seconds * CENTIS_PER_SECOND as f64).round() as i64
}

impl fmt::Display for AssTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / CENTIS_PER_HOUR;
        let minutes = (self.0 % CENTIS_PER_HOUR) / CENTIS_PER_MINUTE;
        let seconds = (self.0 % CENTIS_PER_MINUTE) / CENTIS_PER_SECOND;
        let centis = self.0 % CENTIS_PER_SECOND;
        write!(f, "{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    }
}

impl FromStr for AssTime {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timestamp(s)
    }
}

/// Format seconds as an ASS timestamp (`H:MM:SS.cc`), truncating centiseconds
pub fn format_timestamp(seconds: f64) -> String {
    AssTime::from_seconds(seconds).to_string()
}

/// Parse an ASS timestamp. The fraction may carry any number of digits;
/// digits past the centisecond are truncated.
pub fn parse_timestamp(literal: &str) -> Result<AssTime, CaptionError> {
    let invalid = || CaptionError::Format(literal.to_string());
    let trimmed = literal.trim();

    let (clock, fraction) = trimmed.rsplit_once('.').ok_or_else(invalid)?;
    let mut parts = clock.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let hours = parse_digits(h).ok_or_else(invalid)?;
    let minutes = parse_digits(m).filter(|_| m.len() == 2).ok_or_else(invalid)?;
    let seconds = parse_digits(s).filter(|_| s.len() == 2).ok_or_else(invalid)?;
    if minutes >= 60 || seconds >= 60 || parse_digits(fraction).is_none() {
        return Err(invalid());
    }

    // "5" means 50 cs, "123" means 12 cs
    let centis = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(2)
        .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));

    hours
        .checked_mul(CENTIS_PER_HOUR)
        .and_then(|total| total.checked_add(minutes * CENTIS_PER_MINUTE + seconds * CENTIS_PER_SECOND + centis))
        .map(AssTime)
        .ok_or_else(invalid)
}

fn parse_digits(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

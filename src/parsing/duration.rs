use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::str::FromStr;

use regex::Regex;

use crate::parsing::error::{Conversion, ConversionError};
use crate::parsing::parse_result::ParseResult;

/// Quantities of a typed duration. At least one is present after matching.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DurationInput {
    pub hours: Option<f64>,
    pub minutes: Option<i64>,
}

/// Elapsed time in whole minutes. Signed, although parsing never produces a
/// negative value.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ResolvedDuration {
    minutes: i64,
}

impl ResolvedDuration {
    pub const ZERO: ResolvedDuration = ResolvedDuration { minutes: 0 };

    pub const fn from_minutes(minutes: i64) -> Self {
        ResolvedDuration { minutes }
    }

    pub fn num_minutes(&self) -> i64 {
        self.minutes
    }

    /// `None` when the value is outside what `chrono` can represent, which
    /// only a hand-edited state file can produce.
    pub fn to_chrono(self) -> Option<chrono::Duration> {
        chrono::Duration::try_minutes(self.minutes)
    }
}

impl Add for ResolvedDuration {
    type Output = ResolvedDuration;

    fn add(self, rhs: ResolvedDuration) -> Self::Output {
        ResolvedDuration::from_minutes(self.minutes.saturating_add(rhs.minutes))
    }
}

impl Display for ResolvedDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let abs = self.minutes.unsigned_abs();
        if self.minutes < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}h{:02}m", abs / 60, abs % 60)
    }
}

pub fn match_duration(text: &str) -> Option<DurationInput> {
    let c = DURATION.captures(text)?;
    let hours = match c.name("hours") {
        Some(h) => Some(f64::from_str(h.as_str()).ok()?),
        None => None,
    };
    let minutes = match c.name("minutes") {
        Some(m) => Some(i64::from_str(m.as_str()).ok()?),
        None => None,
    };
    if hours.is_none() && minutes.is_none() {
        None
    } else {
        Some(DurationInput { hours, minutes })
    }
}

/// Totals the quantities as `round(hours * 60) + minutes`.
///
/// Fractional minutes round half away from zero. Totals that do not fit a
/// `chrono::Duration` are unparseable.
pub fn resolve_duration(input: DurationInput) -> Result<ResolvedDuration, ConversionError> {
    let from_hours = (input.hours.unwrap_or(0.0) * 60.0).round();
    // NaN fails both comparisons
    if !(from_hours > -MAX_MINUTES && from_hours < MAX_MINUTES) {
        return Err(ConversionError::UNPARSEABLE_DURATION);
    }
    let total = (from_hours as i64)
        .checked_add(input.minutes.unwrap_or(0))
        .ok_or(ConversionError::UNPARSEABLE_DURATION)?;

    if total < 0 {
        Err(ConversionError::NegativeDuration)
    } else if chrono::Duration::try_minutes(total).is_none() {
        Err(ConversionError::UNPARSEABLE_DURATION)
    } else {
        Ok(ResolvedDuration::from_minutes(total))
    }
}

const MAX_MINUTES: f64 = i64::MAX as f64;

pub fn parse_duration(text: &str) -> Conversion<ResolvedDuration> {
    if text.trim().is_empty() {
        return ParseResult::None;
    }
    match match_duration(text) {
        Some(input) => resolve_duration(input).into(),
        None => ParseResult::Invalid(ConversionError::UNPARSEABLE_DURATION),
    }
}

lazy_static::lazy_static! {
    static ref DURATION: Regex = Regex::new(
        r"(?i)^\s*(?:(?P<hours>[0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*[h:])?\s*(?:(?P<minutes>[0-9]+)\s*m?)?\s*$"
    ).unwrap();
}

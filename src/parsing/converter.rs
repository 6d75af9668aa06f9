use chrono::NaiveDateTime;

use crate::parsing::duration::{parse_duration, ResolvedDuration};
use crate::parsing::error::Conversion;
use crate::parsing::format::{format_duration, format_time, DurationTemplate, TimeFormat};
use crate::parsing::parse_result::ParseResult;
use crate::parsing::time_of_day::{parse_time, ResolvedTimestamp};

/// Two-way mapping between the text of an input field and its value.
///
/// `to_value` runs on every edit. It keeps no state, the outcome carries the
/// error together with the missing value.
pub trait Converter {
    type Value;

    fn to_string(&self, value: Option<&Self::Value>) -> String;

    fn to_value(&self, text: &str, now: NaiveDateTime) -> Conversion<Self::Value>;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct NameConverter;

impl Converter for NameConverter {
    type Value = String;

    fn to_string(&self, value: Option<&String>) -> String {
        value.map(|v| v.trim().to_string()).unwrap_or_default()
    }

    fn to_value(&self, text: &str, _now: NaiveDateTime) -> Conversion<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            ParseResult::None
        } else {
            ParseResult::Valid(trimmed.to_string())
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct TimeConverter {
    pub format: TimeFormat,
}

impl Converter for TimeConverter {
    type Value = ResolvedTimestamp;

    fn to_string(&self, value: Option<&ResolvedTimestamp>) -> String {
        format_time(value, self.format)
    }

    fn to_value(&self, text: &str, now: NaiveDateTime) -> Conversion<ResolvedTimestamp> {
        parse_time(text, now)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DurationConverter {
    pub template: DurationTemplate,
}

impl Converter for DurationConverter {
    type Value = ResolvedDuration;

    fn to_string(&self, value: Option<&ResolvedDuration>) -> String {
        format_duration(value, &self.template)
    }

    fn to_value(&self, text: &str, _now: NaiveDateTime) -> Conversion<ResolvedDuration> {
        parse_duration(text)
    }
}

/// Formats `value` and reads it back, as an input field does when a stored
/// value is loaded into it.
pub fn reload<C: Converter>(
    converter: &C,
    value: Option<&C::Value>,
    now: NaiveDateTime,
) -> Conversion<C::Value> {
    converter.to_value(&converter.to_string(value), now)
}

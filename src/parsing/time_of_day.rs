use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

use crate::parsing::error::{Conversion, ConversionError};
use crate::parsing::format::TimeFormat;
use crate::parsing::parse_result::ParseResult;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Meridiem {
    Am,
    Pm,
    Unspecified,
}

impl Meridiem {
    fn from_token(token: Option<&str>) -> Meridiem {
        match token.and_then(|t| t.chars().next()) {
            Some('a' | 'A') => Meridiem::Am,
            Some('p' | 'P') => Meridiem::Pm,
            _ => Meridiem::Unspecified,
        }
    }
}

/// Fields of a typed clock time, not yet range checked.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimeOfDayInput {
    pub hour: u32,
    pub minute: Option<u32>,
    pub meridiem: Meridiem,
}

impl TimeOfDayInput {
    pub fn new(hour: u32, minute: Option<u32>, meridiem: Meridiem) -> Self {
        TimeOfDayInput {
            hour,
            minute,
            meridiem,
        }
    }
}

/// A concrete local point in time with seconds cleared.
///
/// Produced by [`resolve_time`], which never yields a value before the `now`
/// it was resolved against.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResolvedTimestamp(NaiveDateTime);

impl ResolvedTimestamp {
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<ResolvedTimestamp> for NaiveDateTime {
    fn from(t: ResolvedTimestamp) -> Self {
        t.0
    }
}

impl Display for ResolvedTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&TimeFormat::Editable.render(&self.0))
    }
}

pub fn match_time(text: &str) -> Option<TimeOfDayInput> {
    if let Some(c) = TIME_COLON.captures(text) {
        convert_captures(&c)
    } else if let Some(c) = TIME_COMPACT.captures(text) {
        convert_captures(&c)
    } else {
        None
    }
}

fn convert_captures(c: &Captures) -> Option<TimeOfDayInput> {
    let hour = u32::from_str(c.name("hour")?.as_str()).ok()?;
    let minute = match c.name("minute") {
        Some(m) => Some(u32::from_str(m.as_str()).ok()?),
        None => None,
    };
    let meridiem = Meridiem::from_token(c.name("meridiem").map(|m| m.as_str()));
    Some(TimeOfDayInput::new(hour, minute, meridiem))
}

/// Resolves a typed clock time to its next occurrence at or after `now`.
///
/// The bare hour is tried as AM of today first. Without a meridiem the
/// candidate moves forward in half-day steps, at most twice. An explicit
/// meridiem pins the half of the day, so only whole days are added.
pub fn resolve_time(
    input: TimeOfDayInput,
    now: NaiveDateTime,
) -> Result<ResolvedTimestamp, ConversionError> {
    if !(1..=12).contains(&input.hour) {
        return Err(ConversionError::HourOutOfRange);
    }
    let minute = input.minute.unwrap_or(0);
    if minute > 59 {
        return Err(ConversionError::MinuteOutOfRange);
    }

    let time = NaiveTime::from_hms_opt(input.hour % 12, minute, 0)
        .ok_or(ConversionError::MinuteOutOfRange)?;
    let mut candidate = now.date().and_time(time);

    match input.meridiem {
        Meridiem::Unspecified => {
            for _ in 0..2 {
                if candidate < now {
                    candidate += Duration::hours(12);
                }
            }
        }
        Meridiem::Pm => {
            candidate += Duration::hours(12);
            if candidate < now {
                candidate += Duration::days(1);
            }
        }
        Meridiem::Am => {
            if candidate < now {
                candidate += Duration::days(1);
            }
        }
    }

    Ok(ResolvedTimestamp(candidate))
}

pub fn parse_time(text: &str, now: NaiveDateTime) -> Conversion<ResolvedTimestamp> {
    if text.trim().is_empty() {
        return ParseResult::None;
    }
    ParseResult::from(match_time(text).ok_or(ConversionError::UNPARSEABLE_TIME))
        .and_then(|input| resolve_time(input, now).into())
}

lazy_static::lazy_static! {
    static ref TIME_COLON: Regex = Regex::new(
        r"(?i)^\s*(?P<hour>[0-9]{1,2})\s*:\s*(?P<minute>[0-9]{1,2})?\s*(?P<meridiem>[ap]m?)?\s*$"
    ).unwrap();
    // A lone one or two digit number is always the hour, so "12" never becomes 1:02.
    static ref TIME_COMPACT: Regex = Regex::new(
        r"(?i)^\s*(?P<hour>[0-9]{1,2}?)(?P<minute>[0-9]{2})?\s*(?P<meridiem>[ap]m?)?\s*$"
    ).unwrap();
}

#[cfg(test)]
mod test {
    use chrono::NaiveDateTime;

    use crate::parsing::error::ConversionError;
    use crate::parsing::parse_result::ParseResult;
    use crate::parsing::time_of_day::{
        match_time, parse_time, resolve_time, Meridiem, TimeOfDayInput,
    };
    use crate::util::{StaticTimeline, TimelineProvider};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn resolve(text: &str, now: &str) -> NaiveDateTime {
        parse_time(text, at(now)).get().unwrap().datetime()
    }

    #[test]
    fn match_shapes() {
        use Meridiem::*;
        let cases = [
            ("1", TimeOfDayInput::new(1, None, Unspecified)),
            ("12", TimeOfDayInput::new(12, None, Unspecified)),
            ("13", TimeOfDayInput::new(13, None, Unspecified)),
            ("130", TimeOfDayInput::new(1, Some(30), Unspecified)),
            ("1230", TimeOfDayInput::new(12, Some(30), Unspecified)),
            ("130pm", TimeOfDayInput::new(1, Some(30), Pm)),
            ("1:30", TimeOfDayInput::new(1, Some(30), Unspecified)),
            ("1:5", TimeOfDayInput::new(1, Some(5), Unspecified)),
            ("13:05", TimeOfDayInput::new(13, Some(5), Unspecified)),
            ("1 : 30 PM", TimeOfDayInput::new(1, Some(30), Pm)),
            ("9a", TimeOfDayInput::new(9, None, Am)),
            ("12AM", TimeOfDayInput::new(12, None, Am)),
            (" 7 p ", TimeOfDayInput::new(7, None, Pm)),
            ("4:", TimeOfDayInput::new(4, None, Unspecified)),
        ];
        for (text, expected) in cases {
            assert_eq!(match_time(text), Some(expected), "input '{}'", text);
        }
    }

    #[test]
    fn no_match() {
        for text in ["", "abc", ":30", "12345", "1:30x", "1pmm", "1.5", "1 2", "-1"] {
            assert_eq!(match_time(text), None, "input '{}'", text);
        }
    }

    #[test]
    fn twelve_alone_is_twelve_o_clock() {
        assert_eq!(resolve("12", "2022-01-10 11:00"), at("2022-01-10 12:00"));
        assert_eq!(resolve("12:00", "2022-01-10 11:00"), at("2022-01-10 12:00"));
        assert_eq!(resolve("12", "2022-01-10 12:30"), at("2022-01-11 00:00"));
    }

    #[test]
    fn ambiguous_hour_takes_nearest_half_day() {
        let now = "2022-01-10 09:15";
        assert_eq!(resolve("10", now), at("2022-01-10 10:00"));
        assert_eq!(resolve("9", now), at("2022-01-10 21:00"));
        assert_eq!(resolve("9:15", now), at("2022-01-10 09:15"));

        let late = "2022-01-10 22:00";
        assert_eq!(resolve("9", late), at("2022-01-11 09:00"));
        assert_eq!(resolve("11", late), at("2022-01-10 23:00"));
    }

    #[test]
    fn pm_rolls_a_full_day() {
        assert_eq!(resolve("1pm", "2022-01-10 14:00"), at("2022-01-11 13:00"));
        assert_eq!(resolve("1pm", "2022-01-10 12:00"), at("2022-01-10 13:00"));
        assert_eq!(resolve("12pm", "2022-01-10 11:00"), at("2022-01-10 12:00"));
    }

    #[test]
    fn am_rolls_a_full_day() {
        assert_eq!(resolve("8am", "2022-01-10 07:00"), at("2022-01-10 08:00"));
        assert_eq!(resolve("8am", "2022-01-10 09:00"), at("2022-01-11 08:00"));
        assert_eq!(resolve("12a", "2022-01-10 09:00"), at("2022-01-11 00:00"));
    }

    #[test]
    fn present_counts_as_future() {
        assert_eq!(resolve("3:30pm", "2022-01-10 15:30"), at("2022-01-10 15:30"));
    }

    #[test]
    fn seconds_of_now_are_respected() {
        let now = at("2022-01-10 13:00") + chrono::Duration::seconds(30);
        let resolved = parse_time("1pm", now).get().unwrap().datetime();
        assert_eq!(resolved, at("2022-01-11 13:00"));
    }

    #[test]
    fn range_errors() {
        let now = at("2022-01-10 09:00");
        assert_eq!(
            parse_time("13", now),
            ParseResult::Invalid(ConversionError::HourOutOfRange)
        );
        assert_eq!(
            parse_time("0:30", now),
            ParseResult::Invalid(ConversionError::HourOutOfRange)
        );
        assert_eq!(
            parse_time("1:75", now),
            ParseResult::Invalid(ConversionError::MinuteOutOfRange)
        );
        assert_eq!(
            parse_time("175", now),
            ParseResult::Invalid(ConversionError::MinuteOutOfRange)
        );
        assert_eq!(
            resolve_time(TimeOfDayInput::new(0, None, Meridiem::Pm), now),
            Err(ConversionError::HourOutOfRange)
        );
    }

    #[test]
    fn cleared_and_unparseable_differ() {
        let now = at("2022-01-10 09:00");
        assert_eq!(parse_time("", now), ParseResult::None);
        assert_eq!(parse_time("   ", now), ParseResult::None);
        assert_eq!(
            parse_time("noon", now),
            ParseResult::Invalid(ConversionError::UNPARSEABLE_TIME)
        );
    }

    #[test]
    fn resolves_against_static_timeline() {
        let timeline = StaticTimeline::parse("2022-01-10 12:59").unwrap();
        assert_eq!(
            parse_time("1", timeline.now()).get().unwrap().datetime(),
            at("2022-01-10 13:00")
        );
        timeline.advance(2);
        assert_eq!(
            parse_time("1", timeline.now()).get().unwrap().datetime(),
            at("2022-01-11 01:00")
        );
    }
}

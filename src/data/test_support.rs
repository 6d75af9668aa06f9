use chrono::NaiveDateTime;

use crate::data::Step;
use crate::parsing::{parse_duration, parse_time, ResolvedTimestamp};

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

/// Resolves `text` the way the time field would at `now`
pub fn ts(text: &str, now: &str) -> ResolvedTimestamp {
    parse_time(text, at(now)).get().unwrap()
}

pub fn step(name: &str, duration: &str) -> Step {
    Step::new(name, parse_duration(duration).get())
}

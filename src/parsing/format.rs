use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserializer, Serializer};
use thiserror::Error;

use crate::parsing::duration::ResolvedDuration;
use crate::parsing::time_of_day::ResolvedTimestamp;

const MINUTES_PER_DAY: u64 = 24 * 60;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TimeFormat {
    /// `1:30 PM`, the form an editable field shows and parses back.
    #[default]
    Editable,
    /// `Sun, 1:30 PM`, for read only labels.
    Display,
}

impl TimeFormat {
    fn pattern(self) -> &'static str {
        match self {
            TimeFormat::Editable => "%-I:%M %p",
            TimeFormat::Display => "%a, %-I:%M %p",
        }
    }

    pub fn render(self, value: &NaiveDateTime) -> String {
        value.format(self.pattern()).to_string()
    }
}

pub fn format_time(value: Option<&ResolvedTimestamp>, format: TimeFormat) -> String {
    value
        .map(|v| format.render(&v.datetime()))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum TemplateError {
    #[error("Unknown placeholder '{{{0}}}', expected {{h}} or {{m}}")]
    UnknownPlaceholder(String),
    #[error("Unterminated placeholder in '{0}'")]
    Unterminated(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Literal(String),
    Hours,
    Minutes,
}

/// A duration layout such as `{h}:{m}` or `{h}h {m}m`.
///
/// `{h}` is the number of whole hours, `{m}` the remaining minutes padded to
/// two digits.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DurationTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl DurationTemplate {
    pub const DEFAULT: &'static str = "{h}:{m}";

    pub fn parse(source: &str) -> Result<DurationTemplate, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| TemplateError::Unterminated(source.to_string()))?;
            let segment = match &after[..close] {
                "h" => Segment::Hours,
                "m" => Segment::Minutes,
                other => return Err(TemplateError::UnknownPlaceholder(other.to_string())),
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
            rest = &after[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(DurationTemplate {
            source: source.to_string(),
            segments,
        })
    }

    pub fn render(&self, value: &ResolvedDuration) -> String {
        let total = value.num_minutes();
        let abs = total.unsigned_abs();
        let mut out = String::new();
        if total < 0 {
            out.push('-');
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(l) => out.push_str(l),
                Segment::Hours => out.push_str(&(abs / 60).to_string()),
                Segment::Minutes => out.push_str(&format!("{:02}", abs % 60)),
            }
        }
        out
    }
}

impl Default for DurationTemplate {
    fn default() -> Self {
        DurationTemplate {
            source: Self::DEFAULT.to_string(),
            segments: vec![
                Segment::Hours,
                Segment::Literal(":".to_string()),
                Segment::Minutes,
            ],
        }
    }
}

impl FromStr for DurationTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DurationTemplate::parse(s)
    }
}

impl Display for DurationTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl serde::Serialize for DurationTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> serde::Deserialize<'de> for DurationTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(TemplateVisitor)
    }
}

struct TemplateVisitor;
impl<'de> serde::de::Visitor<'de> for TemplateVisitor {
    type Value = DurationTemplate;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duration template using {{h}} and {{m}}")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        DurationTemplate::parse(v).map_err(E::custom)
    }
}

pub fn format_duration(value: Option<&ResolvedDuration>, template: &DurationTemplate) -> String {
    value.map(|v| template.render(v)).unwrap_or_default()
}

/// `H:MM`, or `D:HH:MM` once the duration reaches a full day.
pub fn format_duration_compact(value: Option<&ResolvedDuration>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let total = value.num_minutes();
    let abs = total.unsigned_abs();
    let sign = if total < 0 { "-" } else { "" };
    let (h, m) = (abs / 60, abs % 60);
    if abs >= MINUTES_PER_DAY {
        format!("{}{}:{:02}:{:02}", sign, abs / MINUTES_PER_DAY, h % 24, m)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}

pub use converter::{reload, Converter, DurationConverter, NameConverter, TimeConverter};
pub use duration::{parse_duration, ResolvedDuration};
pub use error::{Conversion, ConversionError};
pub use format::{format_duration_compact, DurationTemplate, TimeFormat};
pub use time_of_day::ResolvedTimestamp;

#[cfg(test)]
pub use time_of_day::parse_time;

mod converter;
mod duration;
mod error;
mod format;
mod parse_result;
mod time_of_day;

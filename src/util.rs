use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDateTime;

/// Source of the current local time.
///
/// Sample it once per operation and pass the value on, so every step of a
/// computation sees the same "now".
pub trait TimelineProvider: Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub type Timeline = Arc<dyn TimelineProvider>;

#[derive(Debug)]
pub struct DefaultTimeline;

impl TimelineProvider for DefaultTimeline {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct StaticTimeline(Mutex<NaiveDateTime>);

impl StaticTimeline {
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M";

    pub fn new(now: NaiveDateTime) -> StaticTimeline {
        StaticTimeline(Mutex::new(now))
    }

    pub fn parse(s: &str) -> chrono::ParseResult<StaticTimeline> {
        NaiveDateTime::parse_from_str(s, Self::FORMAT).map(StaticTimeline::new)
    }

    #[cfg(test)]
    pub fn advance(&self, minutes: i64) {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += chrono::Duration::minutes(minutes);
    }
}

impl TimelineProvider for StaticTimeline {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<StaticTimeline> for Timeline {
    fn from(t: StaticTimeline) -> Self {
        Arc::new(t)
    }
}

#[cfg(test)]
mod test {
    use crate::util::{StaticTimeline, Timeline, TimelineProvider};

    #[test]
    fn static_timeline_advances() {
        let timeline = StaticTimeline::parse("2022-01-10 23:59").unwrap();
        timeline.advance(1);
        assert_eq!(timeline.now().to_string(), "2022-01-11 00:00:00");

        let shared: Timeline = timeline.into();
        assert_eq!(shared.now().to_string(), "2022-01-11 00:00:00");
    }

    #[test]
    fn static_timeline_rejects_garbage() {
        assert!(StaticTimeline::parse("yesterday").is_err());
    }
}

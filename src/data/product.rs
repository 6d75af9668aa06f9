use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;

use crate::parsing::{ResolvedDuration, ResolvedTimestamp};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named preparation step. Steps run back to back and the last one ends
/// when the product is due.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Step {
    pub name: String,
    pub duration: Option<ResolvedDuration>,
}

impl Step {
    pub fn new(name: impl Into<String>, duration: Option<ResolvedDuration>) -> Step {
        Step {
            name: name.into(),
            duration,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Product {
    /// Assigned the first time the product is edited
    pub id: Option<ProductId>,
    pub name: String,
    pub done: Option<ResolvedTimestamp>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Product {
    #[cfg(test)]
    pub fn named(name: impl Into<String>) -> Product {
        Product {
            name: name.into(),
            ..Product::default()
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.is_empty()
    }

    pub fn add_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn remove_step(&mut self, index: usize) -> Option<Step> {
        if index < self.steps.len() {
            Some(self.steps.remove(index))
        } else {
            None
        }
    }

    pub fn total_duration(&self) -> ResolvedDuration {
        self.steps
            .iter()
            .filter_map(|s| s.duration)
            .fold(ResolvedDuration::ZERO, |acc, d| acc + d)
    }

    /// Start time of every step, counted backwards from `done`.
    ///
    /// Steps without a duration take no time. A start before the earliest
    /// representable date is `None`, and so is every step before it.
    pub fn step_starts(&self) -> Vec<(&Step, Option<NaiveDateTime>)> {
        let mut end = self.done.map(|done| done.datetime());
        let mut starts: Vec<_> = self
            .steps
            .iter()
            .rev()
            .map(|step| {
                end = end.and_then(|end| {
                    let duration = step.duration.unwrap_or_default().to_chrono()?;
                    end.checked_sub_signed(duration)
                });
                (step, end)
            })
            .collect();
        starts.reverse();
        starts
    }
}

//! Raw health events as reported by an external store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The category of a raw health event.
///
/// Categories are resolved once at the store boundary (e.g. from a workout
/// sub-type) and carried as a closed enum from then on; downstream code never
/// re-infers them from loosely-typed payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Sleep,
    Exercise,
    Meal,
}

impl EventCategory {
    /// All categories, in the order stores are asked for them.
    pub const ALL: [Self; 3] = [Self::Sleep, Self::Exercise, Self::Meal];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Exercise => "exercise",
            Self::Meal => "meal",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sleep" => Ok(Self::Sleep),
            "exercise" | "workout" => Ok(Self::Exercise),
            "meal" => Ok(Self::Meal),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Error type for unknown event category strings.
#[derive(Debug, Clone, Error)]
#[error("unknown event category: {0}")]
pub struct UnknownCategory(String);

/// A positive assertion from the health store: the subject was asleep,
/// exercising, or eating over a span of time.
///
/// Raw events are immutable snapshots. They may overlap one another and
/// arrive unsorted; timeline reconstruction sorts out both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When the event began.
    pub start: DateTime<Utc>,
    /// When the event ended.
    pub end: DateTime<Utc>,
    /// What kind of activity this was.
    pub category: EventCategory,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>, category: EventCategory) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    /// The span between start and end.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

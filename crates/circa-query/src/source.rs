//! Store traits implemented by callers.
//!
//! The external health store (the system's only boundary) is abstracted as
//! two fetch capabilities. Implementations are expected to be asynchronous
//! and may complete on arbitrary workers; any timeout policy is theirs.

use std::future::Future;

use chrono::{DateTime, Utc};
use circa_core::{DailySample, Event, EventCategory};

/// Supplies raw circadian events for a time range.
pub trait EventSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches all events of the given categories overlapping
    /// `[start, end]`. Returned events need not be sorted and may overlap
    /// one another.
    fn fetch_events(
        &self,
        categories: &[EventCategory],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send;
}

/// Supplies numeric measure samples (e.g. daily statistics) for a time
/// range, for correlation against fasting durations.
pub trait MeasureSource: Send + Sync {
    type Sample: DailySample + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_measures(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Self::Sample>, Self::Error>> + Send;
}

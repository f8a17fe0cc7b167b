//! Core domain logic for circadian health analytics.
//!
//! This crate contains the fundamental types and logic for:
//! - Timeline reconstruction: deriving a gap-free sequence of circadian
//!   states (sleep, exercise, meals, fasting) from raw health events
//! - Aggregation: per-day eating totals, maximum fasting windows, and
//!   single-pass fasting summaries
//! - Frequent activities: recurring-event detection across historical days
//! - Correlation: joining fasting durations with daily health measures
//!
//! Everything here is pure and synchronous; fetching events from a store is
//! the `circa-query` crate's concern.

pub mod aggregate;
pub mod correlate;
pub mod event;
pub mod frequent;
pub mod timeline;

pub use aggregate::{
    FastingSummary, eating_times_by_day, fasting_summary, fold_timeline, max_fasting_by_day,
};
pub use correlate::{CorrelationOrder, CorrelationPoint, DailySample, correlate, daily_totals};
pub use event::{Event, EventCategory, UnknownCategory};
pub use frequent::{DaySet, FrequentActivity, frequent_activities, lookback_days};
pub use timeline::{
    CircadianState, Interval, Timeline, TimelineConfig, TimelinePoint, distant_past,
    reconstruct_timeline,
};

//! Reductions over a reconstructed timeline.
//!
//! All aggregations walk the two-point representation directly, pairing each
//! closing endpoint with the opening endpoint before it. Day buckets are
//! calendar days (time-of-day truncated) in UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::timeline::{CircadianState, Timeline, TimelinePoint};

/// A generic predicate-filtered left-fold over timeline points.
///
/// The concrete reductions below are specializations of this shape; it is
/// public so callers can build their own.
pub fn fold_timeline<T, P, F>(timeline: &Timeline, mut predicate: P, fold: F, initial: T) -> T
where
    P: FnMut(&TimelinePoint) -> bool,
    F: FnMut(T, &TimelinePoint) -> T,
{
    timeline
        .points()
        .iter()
        .filter(|point| predicate(point))
        .fold(initial, fold)
}

/// Total eating time per calendar day, in hours.
///
/// Each meal interval's duration is bucketed under the day of the endpoint
/// preceding the meal's closing point, i.e. its (possibly nudged) start. For
/// a meal crossing midnight this attributes the whole meal to the day it
/// began. This asymmetric attribution is a deliberate behavioral policy kept
/// for parity with existing analytics.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn eating_times_by_day(timeline: &Timeline) -> BTreeMap<NaiveDate, f64> {
    let mut at_interval_start = true;
    let mut prev: Option<DateTime<Utc>> = None;
    let mut seconds_by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    for point in timeline.points() {
        if !at_interval_start {
            if let Some(prev_at) = prev {
                if point.state == CircadianState::Meal {
                    *seconds_by_day.entry(prev_at.date_naive()).or_insert(0) +=
                        (point.at - prev_at).num_seconds();
                }
            }
        }
        at_interval_start = !at_interval_start;
        prev = Some(point.at);
    }

    seconds_by_day
        .into_iter()
        .map(|(day, seconds)| (day, seconds as f64 / 3600.0))
        .collect()
}

/// Maximum fasting window per calendar day, in hours.
///
/// Meal endpoints are filtered out, and runs of the remaining fasting-class
/// endpoints are accumulated: a run keeps extending while consecutive
/// filtered endpoints coincide exactly, and closes as soon as they differ
/// (which is where a meal, or an epsilon-nudged boundary, sat). Each closed
/// run is bucketed under the day it started, keeping the maximum.
#[must_use]
pub fn max_fasting_by_day(timeline: &Timeline) -> BTreeMap<NaiveDate, f64> {
    let mut at_interval_start = true;
    let mut run_start: Option<DateTime<Utc>> = None;
    let mut prev: Option<DateTime<Utc>> = None;
    let mut seconds_by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    let fasting_class = timeline
        .points()
        .iter()
        .filter(|point| point.state.is_fasting_class());

    for point in fasting_class {
        if at_interval_start {
            match (run_start, prev) {
                (Some(start), Some(prev_at)) if point.at != prev_at => {
                    record_run(&mut seconds_by_day, start, prev_at);
                    run_start = Some(point.at);
                }
                (None, _) => run_start = Some(point.at),
                _ => {}
            }
        }
        at_interval_start = !at_interval_start;
        prev = Some(point.at);
    }

    // Close the trailing run.
    if let (Some(start), Some(prev_at)) = (run_start, prev) {
        if start != prev_at {
            record_run(&mut seconds_by_day, start, prev_at);
        }
    }

    to_hours(seconds_by_day)
}

fn record_run(
    seconds_by_day: &mut BTreeMap<NaiveDate, i64>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) {
    let duration = (end - start).num_seconds();
    let entry = seconds_by_day.entry(start.date_naive()).or_insert(duration);
    *entry = (*entry).max(duration);
}

#[allow(clippy::cast_precision_loss)]
fn to_hours(seconds_by_day: BTreeMap<NaiveDate, i64>) -> BTreeMap<NaiveDate, f64> {
    seconds_by_day
        .into_iter()
        .map(|(day, seconds)| (day, seconds as f64 / 3600.0))
        .collect()
}

/// Combined single-pass statistics over one timeline.
///
/// Unlike [`max_fasting_by_day`], the running fasting window here is tracked
/// by interval state, so it survives epsilon-nudged boundaries and merges
/// every consecutive non-meal interval into one window. Both behaviors are
/// intentional and used by different consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastingSummary {
    /// Total time spent eating.
    pub eating: Duration,
    /// The most recent meal endpoint seen, if any.
    pub last_meal_at: Option<DateTime<Utc>>,
    /// The longest run of consecutive non-meal intervals.
    pub max_fasting_window: Duration,
    /// The length of the final (possibly still open) non-meal run.
    pub current_fasting_window: Duration,
}

#[must_use]
pub fn fasting_summary(timeline: &Timeline) -> FastingSummary {
    let mut eating = Duration::zero();
    let mut last_meal_at: Option<DateTime<Utc>> = None;
    let mut max_fasting = Duration::zero();
    let mut current_fasting = Duration::zero();
    let mut at_interval_start = true;
    let mut prev: Option<TimelinePoint> = None;
    let mut prev_state_was_fasting = false;

    for point in timeline.points() {
        let is_fasting = point.state.is_fasting_class();
        if at_interval_start {
            if let Some(prev_point) = prev {
                prev_state_was_fasting = prev_point.state.is_fasting_class();
            }
        } else if let Some(prev_point) = prev {
            let duration = point.at - prev_point.at;
            if prev_state_was_fasting && is_fasting {
                current_fasting += duration;
                max_fasting = max_fasting.max(current_fasting);
            } else if is_fasting {
                current_fasting = duration;
                max_fasting = max_fasting.max(current_fasting);
            } else {
                eating += duration;
            }
        }
        if point.state == CircadianState::Meal {
            last_meal_at = Some(point.at);
        }
        at_interval_start = !at_interval_start;
        prev = Some(*point);
    }

    FastingSummary {
        eating,
        last_meal_at,
        max_fasting_window: max_fasting,
        current_fasting_window: current_fasting,
    }
}

//! Recurring-activity detection across historical days.
//!
//! Powers "you usually have breakfast around 8am" style suggestions without
//! a persisted schedule model: a rolling window of historical days is
//! reconstructed, recurring non-fasting intervals are collected, and the
//! survivors are projected onto the reference day. Caching the computed set
//! is the caller's concern.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rayon::prelude::*;

use crate::event::Event;
use crate::timeline::{
    CircadianState, Timeline, TimelineConfig, TimelinePoint, reconstruct_timeline,
};

/// The raw events fetched for one historical calendar day.
#[derive(Debug, Clone)]
pub struct DaySet {
    pub day: NaiveDate,
    pub events: Vec<Event>,
}

/// A recurring activity projected onto the reference day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequentActivity {
    /// Human-readable label, derived from the circadian state.
    pub desc: String,
    /// Start time on the reference day.
    pub start: DateTime<Utc>,
    /// How long the activity lasts.
    pub duration: Duration,
}

/// Midnight at the start of `day`, in UTC.
fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// The historical days to query for a given reference day.
///
/// Early-week days look back at yesterday, the day before, and last week's
/// matching weekday; Friday and Saturday look back at the matching day of
/// each of the past four weeks. Every queried day is paired with its eve,
/// since sleep events span the midnight boundary.
#[must_use]
pub fn lookback_days(reference: NaiveDate) -> Vec<NaiveDate> {
    if matches!(reference.weekday(), Weekday::Fri | Weekday::Sat) {
        (1..=4)
            .flat_map(|weeks| {
                let same_day = reference - Days::new(7 * weeks);
                [same_day - Days::new(1), same_day]
            })
            .collect()
    } else {
        let last_week = reference - Days::new(7);
        vec![
            last_week - Days::new(1),
            last_week,
            reference - Days::new(2),
            reference - Days::new(1),
        ]
    }
}

/// Detects recurring activities over several historical days and projects
/// them onto `reference_day`.
///
/// Consecutive queried days exactly one day apart are reconstructed and
/// merged pairwise; every aligned same-state non-fasting endpoint pair in
/// the merged stream becomes a candidate activity. Candidates are then
/// re-anchored to the reference day (preserving time-of-day) and
/// deduplicated by their (time-of-day, duration) key; a later candidate
/// silently replaces an earlier one with the same key. The result is sorted
/// by start time.
#[must_use]
pub fn frequent_activities(
    day_sets: &[DaySet],
    reference_day: NaiveDate,
    config: &TimelineConfig,
) -> Vec<FrequentActivity> {
    let timelines: Vec<(NaiveDate, Timeline)> = day_sets
        .par_iter()
        .map(|set| {
            let start = day_start(set.day);
            let end = day_start(set.day + Days::new(1));
            (set.day, reconstruct_timeline(&set.events, start, end, config))
        })
        .collect();

    let mut candidates: Vec<FrequentActivity> = Vec::new();
    for pair in timelines.windows(2) {
        let (first_day, first) = &pair[0];
        let (second_day, second) = &pair[1];
        if *second_day != *first_day + Days::new(1) {
            continue;
        }

        let merged: Vec<TimelinePoint> = first
            .points()
            .iter()
            .chain(second.points().iter())
            .copied()
            .collect();
        for (index, edge) in merged.iter().enumerate() {
            if index % 2 != 0 {
                continue;
            }
            let Some(next) = merged.get(index + 1) else {
                continue;
            };
            if edge.state != CircadianState::Fasting && edge.state == next.state {
                candidates.push(FrequentActivity {
                    desc: edge.state.to_string(),
                    start: edge.at,
                    duration: next.at - edge.at,
                });
            }
        }
    }

    // Project onto the reference day and deduplicate.
    let mut by_key: HashMap<(i64, i64), FrequentActivity> = HashMap::new();
    for candidate in candidates {
        let offset = candidate.start - day_start(candidate.start.date_naive());
        let start = day_start(reference_day) + offset;
        by_key.insert(
            (offset.num_seconds(), candidate.duration.num_seconds()),
            FrequentActivity { start, ..candidate },
        );
    }

    let mut activities: Vec<FrequentActivity> = by_key.into_values().collect();
    activities.sort_by_key(|activity| activity.start);
    activities
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::event::EventCategory;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).expect("valid test date")
    }

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, h, m, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn meal_day(day: u32) -> DaySet {
        DaySet {
            day: date(day),
            events: vec![Event::new(at(day, 8, 0), at(day, 8, 30), EventCategory::Meal)],
        }
    }

    #[test]
    fn repeated_meal_dedupes_to_one_suggestion() {
        let activities = frequent_activities(
            &[meal_day(10), meal_day(11)],
            date(12),
            &TimelineConfig::default(),
        );

        assert_eq!(activities.len(), 1);
        let activity = &activities[0];
        assert_eq!(activity.desc, "meal");
        assert_eq!(activity.start, at(12, 8, 0));
        assert_eq!(activity.duration, Duration::minutes(30));
    }

    #[test]
    fn non_consecutive_days_are_not_merged() {
        let activities = frequent_activities(
            &[meal_day(10), meal_day(13)],
            date(14),
            &TimelineConfig::default(),
        );
        assert!(activities.is_empty());
    }

    #[test]
    fn distinct_activities_survive_dedup_sorted_by_start() {
        let mut second = meal_day(11);
        second.events.push(Event::new(
            at(11, 18, 0),
            at(11, 18, 45),
            EventCategory::Exercise,
        ));

        let activities = frequent_activities(
            &[meal_day(10), second],
            date(12),
            &TimelineConfig::default(),
        );

        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].desc, "meal");
        assert_eq!(activities[0].start, at(12, 8, 0));
        assert_eq!(activities[1].desc, "exercise");
        assert_eq!(activities[1].start, at(12, 18, 0));
        assert_eq!(activities[1].duration, Duration::minutes(45));
    }

    #[test]
    fn fasting_fills_never_become_suggestions() {
        // A day pair with nothing but one meal each still reconstructs long
        // fasting fills; none of them may surface as an activity.
        let activities = frequent_activities(
            &[meal_day(10), meal_day(11)],
            date(12),
            &TimelineConfig::default(),
        );
        assert!(activities.iter().all(|a| a.desc != "fasting"));
    }

    #[test]
    fn weekday_lookback_queries_last_week_and_recent_days() {
        // 2025-03-12 is a Wednesday.
        let days = lookback_days(date(12));
        assert_eq!(days, vec![date(4), date(5), date(10), date(11)]);
    }

    #[test]
    fn weekend_lookback_queries_past_four_weeks() {
        // 2025-03-15 is a Saturday.
        let days = lookback_days(date(15));
        assert_eq!(days.len(), 8);
        assert_eq!(days[0], date(7));
        assert_eq!(days[1], date(8));
        // Each queried day is preceded by its eve.
        for pair in days.chunks_exact(2) {
            assert_eq!(pair[1], pair[0] + Days::new(1));
        }
    }
}

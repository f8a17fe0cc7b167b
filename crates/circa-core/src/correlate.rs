//! Joining fasting durations with daily health measures.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

/// A measure sample suitable for correlation.
///
/// This trait lets correlation work with whatever sample representation the
/// external store returns (raw quantity samples, daily statistics, test
/// fixtures) as long as it carries a timestamp and a numeric value.
pub trait DailySample {
    /// When the sample was taken.
    fn start(&self) -> DateTime<Utc>;

    /// The sample's numeric value.
    fn value(&self) -> f64;
}

/// Which side of the join drives the output ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationOrder {
    /// Ascending by fasting hours.
    ByFasting,
    /// Ascending by the measure's value.
    ByMeasure,
}

/// One joined day: the fasting duration and the measure sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationPoint<S> {
    pub day: NaiveDate,
    pub fasting_hours: f64,
    pub sample: S,
}

/// Joins measure samples with a fasting-by-day series on the calendar day.
///
/// This is an inner join: a day present on only one side never appears in
/// the output. The result is sorted ascending by the caller-chosen side.
#[must_use]
pub fn correlate<S: DailySample>(
    samples: Vec<S>,
    fasting: &BTreeMap<NaiveDate, f64>,
    order: CorrelationOrder,
) -> Vec<CorrelationPoint<S>> {
    let mut points: Vec<CorrelationPoint<S>> = samples
        .into_iter()
        .filter_map(|sample| {
            let day = sample.start().date_naive();
            fasting.get(&day).map(|hours| CorrelationPoint {
                day,
                fasting_hours: *hours,
                sample,
            })
        })
        .collect();

    match order {
        CorrelationOrder::ByFasting => {
            points.sort_by(|a, b| a.fasting_hours.total_cmp(&b.fasting_hours));
        }
        CorrelationOrder::ByMeasure => {
            points.sort_by(|a, b| a.sample.value().total_cmp(&b.sample.value()));
        }
    }
    points
}

/// Buckets raw samples into per-day value sums.
///
/// The shape the join consumes when the store returns raw samples rather
/// than precomputed daily statistics.
#[must_use]
pub fn daily_totals<S: DailySample>(samples: &[S]) -> BTreeMap<NaiveDate, f64> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sample in samples {
        *by_day.entry(sample.start().date_naive()).or_insert(0.0) += sample.value();
    }
    by_day
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestSample {
        start: DateTime<Utc>,
        value: f64,
    }

    impl DailySample for TestSample {
        fn start(&self) -> DateTime<Utc> {
            self.start
        }

        fn value(&self) -> f64 {
            self.value
        }
    }

    fn at(day: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, h, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn day(d: u32) -> NaiveDate {
        at(d, 0).date_naive()
    }

    fn sample(d: u32, value: f64) -> TestSample {
        TestSample {
            start: at(d, 9),
            value,
        }
    }

    #[test]
    fn join_keeps_only_days_present_on_both_sides() {
        let samples = vec![sample(10, 70.0), sample(11, 72.0), sample(12, 68.0)];
        let fasting: BTreeMap<NaiveDate, f64> =
            [(day(11), 14.5), (day(13), 16.0)].into_iter().collect();

        let points = correlate(samples, &fasting, CorrelationOrder::ByFasting);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].day, day(11));
        assert!((points[0].fasting_hours - 14.5).abs() < f64::EPSILON);
        assert!((points[0].sample.value - 72.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sort_by_fasting_ascending() {
        let samples = vec![sample(10, 70.0), sample(11, 72.0), sample(12, 68.0)];
        let fasting: BTreeMap<NaiveDate, f64> = [(day(10), 16.0), (day(11), 12.0), (day(12), 14.0)]
            .into_iter()
            .collect();

        let points = correlate(samples, &fasting, CorrelationOrder::ByFasting);
        let days: Vec<NaiveDate> = points.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![day(11), day(12), day(10)]);
    }

    #[test]
    fn sort_by_measure_ascending() {
        let samples = vec![sample(10, 70.0), sample(11, 72.0), sample(12, 68.0)];
        let fasting: BTreeMap<NaiveDate, f64> = [(day(10), 16.0), (day(11), 12.0), (day(12), 14.0)]
            .into_iter()
            .collect();

        let points = correlate(samples, &fasting, CorrelationOrder::ByMeasure);
        let days: Vec<NaiveDate> = points.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![day(12), day(10), day(11)]);
    }

    #[test]
    fn empty_sides_join_to_nothing() {
        let fasting: BTreeMap<NaiveDate, f64> = [(day(10), 16.0)].into_iter().collect();
        assert!(correlate(Vec::<TestSample>::new(), &fasting, CorrelationOrder::ByFasting).is_empty());

        let samples = vec![sample(10, 70.0)];
        assert!(correlate(samples, &BTreeMap::new(), CorrelationOrder::ByFasting).is_empty());
    }

    #[test]
    fn daily_totals_sum_same_day_samples() {
        let samples = vec![
            TestSample { start: at(10, 8), value: 1.5 },
            TestSample { start: at(10, 20), value: 2.0 },
            TestSample { start: at(11, 8), value: 4.0 },
        ];

        let totals = daily_totals(&samples);
        assert_eq!(totals.len(), 2);
        assert!((totals[&day(10)] - 3.5).abs() < f64::EPSILON);
        assert!((totals[&day(11)] - 4.0).abs() < f64::EPSILON);
    }
}

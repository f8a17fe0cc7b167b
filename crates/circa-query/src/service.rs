//! Fan-out/fan-in orchestration of store fetches.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use tokio::task::JoinSet;

use circa_core::{
    CorrelationOrder, CorrelationPoint, DaySet, Event, EventCategory, FastingSummary,
    FrequentActivity, Timeline, TimelineConfig, correlate, distant_past, eating_times_by_day,
    fasting_summary, frequent_activities, lookback_days, max_fasting_by_day, reconstruct_timeline,
};

use crate::error::{InputSide, QueryError};
use crate::source::{EventSource, MeasureSource};

/// Midnight at the start of `day`, in UTC.
fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Store-backed circadian analytics.
///
/// Each operation issues the fetches it needs concurrently, waits for all of
/// them (or for the first failure), then runs the pure reconstruction and
/// aggregation over the joined, immutable snapshots. On the first fetch
/// error the operation short-circuits: outstanding fetches are abandoned and
/// no partial data reaches the pure stage.
#[derive(Debug, Clone)]
pub struct TimelineService<S> {
    source: Arc<S>,
    config: TimelineConfig,
}

impl<S> TimelineService<S>
where
    S: EventSource + 'static,
{
    /// Creates a service over `source` with the default reconstruction
    /// configuration.
    #[must_use]
    pub fn new(source: Arc<S>) -> Self {
        Self::with_config(source, TimelineConfig::default())
    }

    #[must_use]
    pub const fn with_config(source: Arc<S>, config: TimelineConfig) -> Self {
        Self { source, config }
    }

    async fn fetch_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, QueryError> {
        self.source
            .fetch_events(&EventCategory::ALL, start, end)
            .await
            .map_err(|err| QueryError::FetchFailed(Box::new(err)))
    }

    /// Reconstructs the circadian timeline for `[start, end]`.
    pub async fn timeline(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Timeline, QueryError> {
        let events = self.fetch_window(start, end).await?;
        Ok(reconstruct_timeline(&events, start, end, &self.config))
    }

    /// Total eating time per day over the store's whole history up to
    /// `until`, in hours.
    pub async fn eating_times(
        &self,
        until: DateTime<Utc>,
    ) -> Result<BTreeMap<NaiveDate, f64>, QueryError> {
        let timeline = self.timeline(distant_past(), until).await?;
        Ok(eating_times_by_day(&timeline))
    }

    /// Maximum fasting window per day over the store's whole history up to
    /// `until`, in hours.
    pub async fn max_fasting_times(
        &self,
        until: DateTime<Utc>,
    ) -> Result<BTreeMap<NaiveDate, f64>, QueryError> {
        let timeline = self.timeline(distant_past(), until).await?;
        Ok(max_fasting_by_day(&timeline))
    }

    /// Combined eating/fasting statistics for the 24 hours ending at `at`.
    pub async fn fasting_summary(&self, at: DateTime<Utc>) -> Result<FastingSummary, QueryError> {
        let timeline = self.timeline(at - Duration::hours(24), at).await?;
        Ok(fasting_summary(&timeline))
    }

    /// Recurring-activity suggestions for `reference_day`.
    ///
    /// Fans out one fetch per historical lookback day, fails fast on the
    /// first store error, and dedupes the recurring intervals found across
    /// consecutive day pairs.
    pub async fn frequent_activities(
        &self,
        reference_day: NaiveDate,
    ) -> Result<Vec<FrequentActivity>, QueryError> {
        let days = lookback_days(reference_day);
        tracing::debug!(fetches = days.len(), %reference_day, "fanning out lookback fetches");

        let mut fetches = JoinSet::new();
        for (index, day) in days.iter().copied().enumerate() {
            let source = Arc::clone(&self.source);
            let start = day_start(day);
            let end = day_start(day + Days::new(1));
            fetches.spawn(async move {
                let events = source.fetch_events(&EventCategory::ALL, start, end).await;
                (index, events)
            });
        }

        // Reassemble results in lookback order; the pairwise merge below
        // depends on consecutive days sitting next to each other.
        let mut per_day: Vec<Vec<Event>> = vec![Vec::new(); days.len()];
        while let Some(joined) = fetches.join_next().await {
            let (index, fetched) = joined.map_err(|err| QueryError::FetchFailed(Box::new(err)))?;
            match fetched {
                Ok(events) => per_day[index] = events,
                // Dropping the set aborts every outstanding fetch.
                Err(err) => return Err(QueryError::FetchFailed(Box::new(err))),
            }
        }

        let day_sets: Vec<DaySet> = days
            .into_iter()
            .zip(per_day)
            .map(|(day, events)| DaySet { day, events })
            .collect();
        Ok(frequent_activities(&day_sets, reference_day, &self.config))
    }

    /// Joins a measure series against maximum fasting times per day.
    ///
    /// The measure fetch and the fasting computation run concurrently; if
    /// either side fails the other is abandoned and the error reports which
    /// input was missing.
    pub async fn correlate_with_fasting<M>(
        &self,
        measures: &M,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        order: CorrelationOrder,
    ) -> Result<Vec<CorrelationPoint<M::Sample>>, QueryError>
    where
        M: MeasureSource,
    {
        let measure_side = async {
            measures
                .fetch_measures(start, end)
                .await
                .map_err(|err| QueryError::IncompleteInputs {
                    side: InputSide::Measure,
                    source: Box::new(err),
                })
        };
        let fasting_side = async {
            let events = self
                .source
                .fetch_events(&EventCategory::ALL, distant_past(), end)
                .await
                .map_err(|err| QueryError::IncompleteInputs {
                    side: InputSide::Fasting,
                    source: Box::new(err),
                })?;
            let timeline = reconstruct_timeline(&events, distant_past(), end, &self.config);
            Ok(max_fasting_by_day(&timeline))
        };

        let (samples, fasting) = tokio::try_join!(measure_side, fasting_side)?;
        Ok(correlate(samples, &fasting, order))
    }
}
